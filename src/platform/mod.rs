// Integrations with external pose estimation backends

pub mod pose;
