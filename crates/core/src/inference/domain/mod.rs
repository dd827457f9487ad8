pub mod detector_model;
pub mod device;
pub mod inference_backend;
pub mod model_error;
pub mod model_files;
pub mod preprocess;
pub mod tensors;
