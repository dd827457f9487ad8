//! Static inspection of ONNX graphs.
//!
//! The runtime only reports unsupported operators once a session fails to
//! build. Reading the protobuf up front lets a model name every operator it
//! needs before any device is touched.

use std::collections::BTreeSet;

use tract_onnx::pb;
use tract_onnx::prelude::Framework;

use crate::inference::domain::inference_backend::NetworkDescription;
use crate::inference::domain::model_error::ModelError;
use crate::inference::domain::model_files::ModelFiles;
use crate::inference::domain::tensors::TensorSpec;

/// Parses `files.structure()` as an ONNX model.
pub fn read_onnx(files: &ModelFiles) -> Result<NetworkDescription, ModelError> {
    let proto = tract_onnx::onnx()
        .proto_model_for_path(files.structure())
        .map_err(|e| ModelError::ModelInit {
            path: files.structure().to_path_buf(),
            reason: format!("not a readable ONNX model: {e:#}"),
        })?;
    describe_model(&proto, files)
}

pub fn describe_model(
    proto: &pb::ModelProto,
    files: &ModelFiles,
) -> Result<NetworkDescription, ModelError> {
    let graph = proto.graph.as_ref().ok_or_else(|| ModelError::ModelInit {
        path: files.structure().to_path_buf(),
        reason: "model has no graph".into(),
    })?;

    let initializers: BTreeSet<&str> = graph.initializer.iter().map(|t| t.name.as_str()).collect();
    let inputs = graph
        .input
        .iter()
        .filter(|i| !initializers.contains(i.name.as_str()))
        .map(|i| TensorSpec::new(i.name.clone(), static_shape(i)))
        .collect();
    let outputs = graph.output.iter().map(|o| o.name.clone()).collect();

    let mut operations = BTreeSet::new();
    collect_operations(graph, &mut operations);

    Ok(NetworkDescription {
        name: files.name(),
        files: files.clone(),
        inputs,
        outputs,
        operations,
    })
}

/// Qualified operator name: bare for the default domain, `domain::op` otherwise.
pub fn operation_name(domain: &str, op_type: &str) -> String {
    if domain.is_empty() || domain == "ai.onnx" {
        op_type.to_string()
    } else {
        format!("{domain}::{op_type}")
    }
}

/// Domain part of a name produced by [`operation_name`].
pub fn operation_domain(name: &str) -> &str {
    name.rsplit_once("::").map(|(domain, _)| domain).unwrap_or("")
}

fn collect_operations(graph: &pb::GraphProto, into: &mut BTreeSet<String>) {
    for node in &graph.node {
        into.insert(operation_name(&node.domain, &node.op_type));
        for attribute in &node.attribute {
            if let Some(sub) = &attribute.g {
                collect_operations(sub, into);
            }
            for sub in &attribute.graphs {
                collect_operations(sub, into);
            }
        }
    }
}

fn static_shape(info: &pb::ValueInfoProto) -> Vec<i64> {
    let Some(pb::type_proto::Value::TensorType(tensor)) =
        info.r#type.as_ref().and_then(|t| t.value.as_ref())
    else {
        return Vec::new();
    };
    let Some(shape) = &tensor.shape else {
        return Vec::new();
    };
    shape
        .dim
        .iter()
        .map(|d| match d.value {
            Some(pb::tensor_shape_proto::dimension::Value::DimValue(v)) if v > 0 => v,
            _ => -1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(op_type: &str, domain: &str) -> pb::NodeProto {
        pb::NodeProto {
            op_type: op_type.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }

    fn dim(value: i64) -> pb::tensor_shape_proto::Dimension {
        pb::tensor_shape_proto::Dimension {
            value: Some(pb::tensor_shape_proto::dimension::Value::DimValue(value)),
            ..Default::default()
        }
    }

    fn symbolic(name: &str) -> pb::tensor_shape_proto::Dimension {
        pb::tensor_shape_proto::Dimension {
            value: Some(pb::tensor_shape_proto::dimension::Value::DimParam(
                name.into(),
            )),
            ..Default::default()
        }
    }

    fn value_info(name: &str, dims: Vec<pb::tensor_shape_proto::Dimension>) -> pb::ValueInfoProto {
        pb::ValueInfoProto {
            name: name.into(),
            r#type: Some(pb::TypeProto {
                value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                    elem_type: 1,
                    shape: Some(pb::TensorShapeProto { dim: dims }),
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn files() -> ModelFiles {
        ModelFiles::from_structure("/models/gaze-estimation-adas-0002.onnx")
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(operation_name("", "Conv"), "Conv");
        assert_eq!(operation_name("ai.onnx", "Relu"), "Relu");
        assert_eq!(
            operation_name("com.microsoft", "FusedConv"),
            "com.microsoft::FusedConv"
        );
        assert_eq!(operation_domain("com.microsoft::FusedConv"), "com.microsoft");
        assert_eq!(operation_domain("Conv"), "");
    }

    #[test]
    fn test_describe_model_collects_inputs_outputs_and_ops() {
        let graph = pb::GraphProto {
            node: vec![node("Conv", ""), node("Relu", ""), node("Conv", "")],
            input: vec![
                value_info("left_eye_image", vec![dim(1), dim(3), dim(60), dim(60)]),
                value_info("head_pose_angles", vec![dim(1), dim(3)]),
                value_info("conv1.weight", vec![dim(8), dim(3), dim(3), dim(3)]),
            ],
            output: vec![value_info("gaze_vector", vec![dim(1), dim(3)])],
            initializer: vec![pb::TensorProto {
                name: "conv1.weight".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let proto = pb::ModelProto {
            graph: Some(graph),
            ..Default::default()
        };

        let network = describe_model(&proto, &files()).unwrap();
        assert_eq!(network.name, "gaze-estimation-adas-0002");
        assert_eq!(
            network.inputs,
            vec![
                TensorSpec::new("left_eye_image", vec![1, 3, 60, 60]),
                TensorSpec::new("head_pose_angles", vec![1, 3]),
            ]
        );
        assert_eq!(network.outputs, vec!["gaze_vector".to_string()]);
        assert_eq!(
            network.operations.iter().collect::<Vec<_>>(),
            vec!["Conv", "Relu"]
        );
    }

    #[test]
    fn test_symbolic_dims_are_dynamic() {
        let graph = pb::GraphProto {
            input: vec![value_info(
                "data",
                vec![symbolic("batch"), dim(3), dim(384), dim(672)],
            )],
            ..Default::default()
        };
        let proto = pb::ModelProto {
            graph: Some(graph),
            ..Default::default()
        };
        let network = describe_model(&proto, &files()).unwrap();
        assert_eq!(network.inputs[0].shape, vec![-1, 3, 384, 672]);
    }

    #[test]
    fn test_subgraph_operations_are_included() {
        let body = pb::GraphProto {
            node: vec![node("Custom", "org.example")],
            ..Default::default()
        };
        let mut looped = node("Loop", "");
        looped.attribute.push(pb::AttributeProto {
            name: "body".into(),
            g: Some(body),
            ..Default::default()
        });
        let proto = pb::ModelProto {
            graph: Some(pb::GraphProto {
                node: vec![looped],
                ..Default::default()
            }),
            ..Default::default()
        };
        let network = describe_model(&proto, &files()).unwrap();
        assert!(network.operations.contains("Loop"));
        assert!(network.operations.contains("org.example::Custom"));
    }

    #[test]
    fn test_model_without_graph_is_init_error() {
        let err = describe_model(&pb::ModelProto::default(), &files()).unwrap_err();
        assert!(matches!(err, ModelError::ModelInit { .. }));
    }

    #[test]
    fn test_garbage_file_is_init_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"definitely not protobuf").unwrap();
        let err = read_onnx(&ModelFiles::from_structure(path)).unwrap_err();
        assert!(err.is_fatal());
    }
}
