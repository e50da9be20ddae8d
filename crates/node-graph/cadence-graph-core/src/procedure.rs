//! Procedures: a graph plus the declared scalar parameters it reads.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::eval::{evaluate_all, GraphRuntime};
use crate::types::GraphSpec;

/// A named scalar parameter a procedure reads through `InputPort::Param`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub default: f64,
}

impl ParameterSpec {
    pub fn clamp(&self, v: f64) -> f64 {
        let v = self.min.map_or(v, |m| v.max(m));
        self.max.map_or(v, |m| v.min(m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcedureInputs<'a> {
    pub position: [f64; 3],
    pub time: f64,
    pub params: &'a [f64],
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Procedure {
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    pub graph: GraphSpec,
}

impl Procedure {
    pub fn new(graph: GraphSpec, parameters: Vec<ParameterSpec>) -> Self {
        Self { parameters, graph }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Default values for every declared parameter, in declaration order.
    pub fn default_params(&self) -> Vec<f64> {
        self.parameters.iter().map(|p| p.default).collect()
    }

    /// Run the graph and return the output position. Coordinates without an output node
    /// pass through from the input position; parameters are clamped to their declared range.
    pub fn evaluate(&self, inputs: &ProcedureInputs<'_>) -> Result<[f64; 3]> {
        let params = inputs
            .params
            .iter()
            .enumerate()
            .map(|(i, v)| match self.parameters.get(i) {
                Some(spec) => spec.clamp(*v),
                None => *v,
            })
            .collect();
        let mut rt = GraphRuntime::new(inputs.time, inputs.position, params);
        evaluate_all(&mut rt, &self.graph)?;
        let mut out = inputs.position;
        for (slot, value) in out.iter_mut().zip(rt.result.iter()) {
            if let Some(v) = value {
                *slot = *v;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InputConnection, InputPort, NodeParams, NodeSpec, NodeType, OutputPort};

    fn lift_y_by_param() -> Procedure {
        let graph = GraphSpec {
            nodes: vec![
                NodeSpec::new("y", NodeType::Input).with_params(NodeParams {
                    port: Some(InputPort::Y),
                    ..Default::default()
                }),
                NodeSpec::new("lift", NodeType::Input).with_params(NodeParams {
                    port: Some(InputPort::Param),
                    index: Some(0),
                    ..Default::default()
                }),
                NodeSpec::new("sum", NodeType::Add)
                    .with_input("a", InputConnection::new("y"))
                    .with_input("b", InputConnection::new("lift")),
                NodeSpec::new("out_y", NodeType::Output)
                    .with_params(NodeParams {
                        output: Some(OutputPort::Y),
                        ..Default::default()
                    })
                    .with_input("in", InputConnection::new("sum")),
            ],
        };
        Procedure::new(
            graph,
            vec![ParameterSpec {
                name: "lift".into(),
                min: Some(0.0),
                max: Some(5.0),
                default: 1.0,
            }],
        )
    }

    #[test]
    fn unconnected_coordinates_pass_through() {
        let procedure = lift_y_by_param();
        let out = procedure
            .evaluate(&ProcedureInputs {
                position: [1.0, 2.0, 3.0],
                time: 0.0,
                params: &[2.0],
            })
            .expect("evaluate");
        assert_eq!(out, [1.0, 4.0, 3.0]);
    }

    #[test]
    fn parameters_are_clamped_to_declared_range() {
        let procedure = lift_y_by_param();
        let out = procedure
            .evaluate(&ProcedureInputs {
                position: [0.0, 0.0, 0.0],
                time: 0.0,
                params: &[50.0],
            })
            .expect("evaluate");
        assert_eq!(out[1], 5.0);
        assert_eq!(procedure.default_params(), vec![1.0]);
    }
}
