// Data models for keypoint frames, gestures, and gesture configuration

pub mod pose;
