use crate::error::Result;
use crate::types::{GraphSpec, InputConnection, InputPort, NodeId, NodeSpec, NodeType, OutputPort, Value};
use hashbrown::HashMap;

/// Per-evaluation state: the procedure inputs plus every node's outputs so far.
#[derive(Debug, Clone, Default)]
pub struct GraphRuntime {
    pub t: f64,
    pub position: [f64; 3],
    pub params: Vec<f64>,
    pub outputs: HashMap<NodeId, HashMap<String, Value>>,
    /// Values written by `Output` nodes, indexed x/y/z.
    pub result: [Option<f64>; 3],
}

impl GraphRuntime {
    pub fn new(t: f64, position: [f64; 3], params: Vec<f64>) -> Self {
        Self {
            t,
            position,
            params,
            ..Default::default()
        }
    }
}

fn as_float(v: &Value) -> f64 {
    match *v {
        Value::Float(f) => f,
        Value::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        Value::Vec3(v) => v[0],
    }
}

fn as_bool(v: &Value) -> bool {
    match *v {
        Value::Float(f) => f != 0.0,
        Value::Bool(b) => b,
        Value::Vec3(v) => v[0] != 0.0 || v[1] != 0.0 || v[2] != 0.0,
    }
}

fn as_vec3(v: &Value) -> [f64; 3] {
    match *v {
        Value::Vec3(a) => a,
        Value::Float(f) => [f, f, f],
        Value::Bool(b) => {
            if b {
                [1.0, 1.0, 1.0]
            } else {
                [0.0, 0.0, 0.0]
            }
        }
    }
}

fn read_inputs(
    rt: &GraphRuntime,
    inputs: &HashMap<String, InputConnection>,
) -> HashMap<String, Value> {
    inputs
        .iter()
        .map(|(input_key, conn)| {
            let val = rt
                .outputs
                .get(&conn.node_id)
                .and_then(|outputs| outputs.get(&conn.output_key))
                .copied()
                .unwrap_or_default();
            (input_key.clone(), val)
        })
        .collect()
}

macro_rules! out_map {
    ($key:expr, $val:expr) => {{
        let mut map = HashMap::new();
        map.insert($key.to_string(), $val);
        map
    }};
    ($val:expr) => {
        out_map!("out", $val)
    };
}

pub fn eval_node(rt: &mut GraphRuntime, spec: &NodeSpec) {
    let ivals = read_inputs(rt, &spec.inputs);
    let t = rt.t;
    let p = &spec.params;

    let get_input = |key: &str| ivals.get(key).copied().unwrap_or_default();

    let outputs = match spec.kind {
        NodeType::Constant => out_map!(p.value.unwrap_or_default()),
        NodeType::Input => {
            let v = match p.port.unwrap_or(InputPort::X) {
                InputPort::X => rt.position[0],
                InputPort::Y => rt.position[1],
                InputPort::Z => rt.position[2],
                InputPort::Time => t,
                InputPort::Param => p
                    .index
                    .and_then(|i| rt.params.get(i).copied())
                    .unwrap_or(0.0),
            };
            out_map!(Value::Float(v))
        }
        NodeType::Time => out_map!(Value::Float(t)),

        NodeType::Add => out_map!(Value::Float(ivals.values().map(as_float).sum())),
        NodeType::Subtract => {
            let first = as_float(&get_input("lhs"));
            let second = as_float(&get_input("rhs"));
            out_map!(Value::Float(first - second))
        }
        NodeType::Multiply => {
            let product = ivals.values().map(as_float).product();
            out_map!(Value::Float(product))
        }
        NodeType::Divide => {
            let lhs = as_float(&get_input("lhs"));
            let rhs = as_float(&get_input("rhs"));
            out_map!(Value::Float(if rhs != 0.0 { lhs / rhs } else { 0.0 }))
        }
        NodeType::Power => {
            let base = as_float(&get_input("base"));
            let exp = as_float(&get_input("exp"));
            out_map!(Value::Float(base.powf(exp)))
        }
        NodeType::Abs => out_map!(Value::Float(as_float(&get_input("in")).abs())),
        NodeType::Sin => out_map!(Value::Float(as_float(&get_input("in")).sin())),
        NodeType::Cos => out_map!(Value::Float(as_float(&get_input("in")).cos())),
        NodeType::Tan => out_map!(Value::Float(as_float(&get_input("in")).tan())),
        NodeType::Min => out_map!(Value::Float(
            as_float(&get_input("lhs")).min(as_float(&get_input("rhs")))
        )),
        NodeType::Max => out_map!(Value::Float(
            as_float(&get_input("lhs")).max(as_float(&get_input("rhs")))
        )),
        NodeType::Oscillator => {
            let f = p.frequency.unwrap_or_else(|| as_float(&get_input("frequency")));
            let phase = p.phase.unwrap_or_else(|| as_float(&get_input("phase")));
            out_map!(Value::Float((std::f64::consts::TAU * f * t + phase).sin()))
        }

        NodeType::GreaterThan => out_map!(Value::Bool(
            as_float(&get_input("lhs")) > as_float(&get_input("rhs"))
        )),
        NodeType::LessThan => out_map!(Value::Bool(
            as_float(&get_input("lhs")) < as_float(&get_input("rhs"))
        )),
        NodeType::If => {
            let cond = as_bool(&get_input("cond"));
            out_map!(if cond {
                get_input("then")
            } else {
                get_input("else")
            })
        }

        NodeType::Clamp => {
            let x = as_float(&get_input("in"));
            let min = as_float(&get_input("min"));
            let max = as_float(&get_input("max"));
            // f64::clamp panics when min > max
            out_map!(Value::Float(x.max(min).min(max)))
        }
        NodeType::Remap => {
            let x = as_float(&get_input("in"));
            let in_min = p.in_min.unwrap_or(0.0);
            let in_max = p.in_max.unwrap_or(1.0);
            let out_min = p.out_min.unwrap_or(0.0);
            let out_max = p.out_max.unwrap_or(1.0);
            let span = in_max - in_min;
            let u = if span != 0.0 {
                ((x - in_min) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            out_map!(Value::Float(out_min + u * (out_max - out_min)))
        }

        NodeType::Vec3 => {
            let x = as_float(&get_input("x"));
            let y = as_float(&get_input("y"));
            let z = as_float(&get_input("z"));
            out_map!(Value::Vec3([x, y, z]))
        }
        NodeType::Vec3Split => {
            let v = as_vec3(&get_input("in"));
            let mut map = HashMap::new();
            map.insert("x".to_string(), Value::Float(v[0]));
            map.insert("y".to_string(), Value::Float(v[1]));
            map.insert("z".to_string(), Value::Float(v[2]));
            map
        }
        NodeType::Vec3Add => {
            let a = as_vec3(&get_input("a"));
            let b = as_vec3(&get_input("b"));
            out_map!(Value::Vec3([a[0] + b[0], a[1] + b[1], a[2] + b[2]]))
        }
        NodeType::Vec3Scale => {
            let s = as_float(&get_input("scalar"));
            let v = as_vec3(&get_input("v"));
            out_map!(Value::Vec3([s * v[0], s * v[1], s * v[2]]))
        }
        NodeType::Vec3Length => {
            let v = as_vec3(&get_input("in"));
            out_map!(Value::Float(
                (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
            ))
        }

        NodeType::Output => {
            let input = get_input("in");
            match p.output {
                Some(OutputPort::X) => rt.result[0] = Some(as_float(&input)),
                Some(OutputPort::Y) => rt.result[1] = Some(as_float(&input)),
                Some(OutputPort::Z) => rt.result[2] = Some(as_float(&input)),
                None => {
                    let v = as_vec3(&input);
                    rt.result = [Some(v[0]), Some(v[1]), Some(v[2])];
                }
            }
            out_map!(input)
        }
    };

    rt.outputs.insert(spec.id.clone(), outputs);
}

pub fn evaluate_all(rt: &mut GraphRuntime, spec: &GraphSpec) -> Result<()> {
    let order = crate::topo::topo_order(&spec.nodes)?;
    let by_id: HashMap<&str, &NodeSpec> = spec.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    for id in order {
        if let Some(node) = by_id.get(id.as_str()) {
            eval_node(rt, node);
        }
    }
    Ok(())
}
