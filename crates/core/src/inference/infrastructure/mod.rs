pub mod execution_provider;
pub mod onnx_graph;
pub mod ort_backend;
