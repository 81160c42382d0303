use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vision_boundary_core::{SdkError, SdkResult};

use super::scenario::{FakeNodeKind, FakeNodeSpec};
use super::{AllocationToken, World};
use crate::sdk::{
    BooleanNode, CommandNode, EnumerationNode, FloatNode, IntegerNode, Node, NodeMap, StringNode,
};
use crate::types::{NativeInterfaceType, NativeVisibility};

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Integer { value: i64, min: i64, max: i64 },
    Boolean(bool),
    Float { value: f64, min: f64, max: f64 },
    Text(String),
    Enumeration(String),
    EnumEntry(String),
    Command { executed: u64 },
    Category,
}

/// Parameter state shared by every handle onto it.
struct NodeState {
    name: String,
    namespace: &'static str,
    visibility: i32,
    interface: i32,
    read_only: bool,
    available: bool,
    unit: String,
    value: Mutex<Value>,
    entries: Vec<Arc<NodeState>>,
}

impl NodeState {
    fn from_spec(spec: &FakeNodeSpec, namespace: &'static str) -> Self {
        let value = match &spec.kind {
            FakeNodeKind::Integer { value, min, max } => Value::Integer {
                value: *value,
                min: *min,
                max: *max,
            },
            FakeNodeKind::Boolean { value } => Value::Boolean(*value),
            FakeNodeKind::Float { value, min, max } => Value::Float {
                value: *value,
                min: *min,
                max: *max,
            },
            FakeNodeKind::String { value } => Value::Text(value.clone()),
            FakeNodeKind::Enumeration { value, .. } => Value::Enumeration(value.clone()),
            FakeNodeKind::Command => Value::Command { executed: 0 },
            FakeNodeKind::Category => Value::Category,
        };
        let entries = match &spec.kind {
            FakeNodeKind::Enumeration {
                entries,
                unavailable,
                ..
            } => entries
                .iter()
                .map(|symbol| {
                    Arc::new(NodeState {
                        name: format!("EnumEntry_{}_{}", spec.name, symbol),
                        namespace,
                        visibility: spec.visibility,
                        interface: 10,
                        read_only: true,
                        available: !unavailable.contains(symbol),
                        unit: String::new(),
                        value: Mutex::new(Value::EnumEntry(symbol.clone())),
                        entries: Vec::new(),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            name: spec.name.clone(),
            namespace,
            visibility: spec.visibility,
            interface: spec.interface.unwrap_or_else(|| interface_of(&spec.kind)),
            read_only: spec.read_only,
            available: true,
            unit: spec.unit.clone(),
            value: Mutex::new(value),
            entries,
        }
    }

    fn value(&self) -> MutexGuard<'_, Value> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One handle onto a simulated parameter. Each lookup, listing or
/// enumeration entry hands out a fresh, counted handle.
pub struct FakeNode {
    state: Arc<NodeState>,
    world: Arc<World>,
    _token: AllocationToken,
}

fn interface_of(kind: &FakeNodeKind) -> i32 {
    match kind {
        FakeNodeKind::Integer { .. } => 2,
        FakeNodeKind::Boolean { .. } => 3,
        FakeNodeKind::Command => 4,
        FakeNodeKind::Float { .. } => 5,
        FakeNodeKind::String { .. } => 6,
        FakeNodeKind::Category => 8,
        FakeNodeKind::Enumeration { .. } => 9,
    }
}

impl FakeNode {
    fn handle(state: &Arc<NodeState>, world: &Arc<World>) -> Arc<Self> {
        Arc::new(Self {
            state: state.clone(),
            world: world.clone(),
            _token: world.track(),
        })
    }

    fn value(&self) -> MutexGuard<'_, Value> {
        self.state.value()
    }

    fn check(&self, op: &str) -> SdkResult<()> {
        self.world.check(op)
    }

    fn writable(&self) -> SdkResult<()> {
        if self.state.read_only {
            return Err(SdkError::known(format!(
                "AccessException: node '{}' is not writable",
                self.state.name
            )));
        }
        Ok(())
    }

    fn kind_mismatch(&self, wanted: &str) -> SdkError {
        SdkError::known(format!("node '{}' is not {wanted}", self.state.name))
    }

    /// Times a command node was executed.
    pub fn execution_count(&self) -> u64 {
        match &*self.value() {
            Value::Command { executed } => *executed,
            _ => 0,
        }
    }
}

impl Node for FakeNode {
    fn name(&self, fully_qualified: bool) -> SdkResult<String> {
        self.check("node.name")?;
        Ok(if fully_qualified {
            format!("{}::{}", self.state.namespace, self.state.name)
        } else {
            self.state.name.clone()
        })
    }

    fn visibility(&self) -> SdkResult<NativeVisibility> {
        self.check("node.visibility")?;
        Ok(NativeVisibility(self.state.visibility))
    }

    fn principal_interface_type(&self) -> SdkResult<NativeInterfaceType> {
        self.check("node.interface")?;
        Ok(NativeInterfaceType(self.state.interface))
    }

    fn as_integer(self: Arc<Self>) -> Option<Arc<dyn IntegerNode>> {
        let matches = matches!(&*self.value(), Value::Integer { .. });
        matches.then(|| self as Arc<dyn IntegerNode>)
    }

    fn as_boolean(self: Arc<Self>) -> Option<Arc<dyn BooleanNode>> {
        let matches = matches!(&*self.value(), Value::Boolean(_));
        matches.then(|| self as Arc<dyn BooleanNode>)
    }

    fn as_float(self: Arc<Self>) -> Option<Arc<dyn FloatNode>> {
        let matches = matches!(&*self.value(), Value::Float { .. });
        matches.then(|| self as Arc<dyn FloatNode>)
    }

    fn as_string(self: Arc<Self>) -> Option<Arc<dyn StringNode>> {
        let matches = matches!(&*self.value(), Value::Text(_));
        matches.then(|| self as Arc<dyn StringNode>)
    }

    fn as_enumeration(self: Arc<Self>) -> Option<Arc<dyn EnumerationNode>> {
        let matches = matches!(&*self.value(), Value::Enumeration(_));
        matches.then(|| self as Arc<dyn EnumerationNode>)
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandNode>> {
        let matches = matches!(&*self.value(), Value::Command { .. });
        matches.then(|| self as Arc<dyn CommandNode>)
    }
}

impl IntegerNode for FakeNode {
    fn value(&self) -> SdkResult<i64> {
        self.check("integer.value")?;
        match &*FakeNode::value(self) {
            Value::Integer { value, .. } => Ok(*value),
            _ => Err(self.kind_mismatch("an integer")),
        }
    }

    fn set_value(&self, new: i64) -> SdkResult<()> {
        self.check("integer.set_value")?;
        self.writable()?;
        match &mut *FakeNode::value(self) {
            Value::Integer { value, min, max } => {
                if new < *min || new > *max {
                    return Err(SdkError::known(format!(
                        "OutOfRangeException: {new} is outside [{min}, {max}] for '{}'",
                        self.state.name
                    )));
                }
                *value = new;
                Ok(())
            }
            _ => Err(self.kind_mismatch("an integer")),
        }
    }

    fn min(&self) -> SdkResult<i64> {
        match &*FakeNode::value(self) {
            Value::Integer { min, .. } => Ok(*min),
            _ => Err(self.kind_mismatch("an integer")),
        }
    }

    fn max(&self) -> SdkResult<i64> {
        match &*FakeNode::value(self) {
            Value::Integer { max, .. } => Ok(*max),
            _ => Err(self.kind_mismatch("an integer")),
        }
    }

    fn unit(&self) -> SdkResult<String> {
        self.check("integer.unit")?;
        Ok(self.state.unit.clone())
    }
}

impl BooleanNode for FakeNode {
    fn value(&self) -> SdkResult<bool> {
        self.check("boolean.value")?;
        match &*FakeNode::value(self) {
            Value::Boolean(value) => Ok(*value),
            _ => Err(self.kind_mismatch("a boolean")),
        }
    }

    fn set_value(&self, new: bool) -> SdkResult<()> {
        self.check("boolean.set_value")?;
        self.writable()?;
        match &mut *FakeNode::value(self) {
            Value::Boolean(value) => {
                *value = new;
                Ok(())
            }
            _ => Err(self.kind_mismatch("a boolean")),
        }
    }
}

impl FloatNode for FakeNode {
    fn value(&self) -> SdkResult<f64> {
        self.check("float.value")?;
        match &*FakeNode::value(self) {
            Value::Float { value, .. } => Ok(*value),
            _ => Err(self.kind_mismatch("a float")),
        }
    }

    fn set_value(&self, new: f64) -> SdkResult<()> {
        self.check("float.set_value")?;
        self.writable()?;
        match &mut *FakeNode::value(self) {
            Value::Float { value, min, max } => {
                if !(*min..=*max).contains(&new) {
                    return Err(SdkError::known(format!(
                        "OutOfRangeException: {new} is outside [{min}, {max}] for '{}'",
                        self.state.name
                    )));
                }
                *value = new;
                Ok(())
            }
            _ => Err(self.kind_mismatch("a float")),
        }
    }

    fn min(&self) -> SdkResult<f64> {
        match &*FakeNode::value(self) {
            Value::Float { min, .. } => Ok(*min),
            _ => Err(self.kind_mismatch("a float")),
        }
    }

    fn max(&self) -> SdkResult<f64> {
        match &*FakeNode::value(self) {
            Value::Float { max, .. } => Ok(*max),
            _ => Err(self.kind_mismatch("a float")),
        }
    }

    fn unit(&self) -> SdkResult<String> {
        self.check("float.unit")?;
        Ok(self.state.unit.clone())
    }
}

impl StringNode for FakeNode {
    fn value(&self) -> SdkResult<String> {
        self.check("string.value")?;
        match &*FakeNode::value(self) {
            Value::Text(value) => Ok(value.clone()),
            _ => Err(self.kind_mismatch("a string")),
        }
    }

    fn set_value(&self, new: &str) -> SdkResult<()> {
        self.check("string.set_value")?;
        self.writable()?;
        match &mut *FakeNode::value(self) {
            Value::Text(value) => {
                *value = new.to_string();
                Ok(())
            }
            _ => Err(self.kind_mismatch("a string")),
        }
    }
}

impl EnumerationNode for FakeNode {
    fn value(&self) -> SdkResult<String> {
        self.check("enumeration.value")?;
        match &*FakeNode::value(self) {
            Value::Enumeration(symbol) => Ok(symbol.clone()),
            _ => Err(self.kind_mismatch("an enumeration")),
        }
    }

    fn set_value(&self, symbol: &str) -> SdkResult<()> {
        self.check("enumeration.set_value")?;
        self.writable()?;
        let entry = self
            .state
            .entries
            .iter()
            .find(|entry| matches!(&*entry.value(), Value::EnumEntry(s) if s == symbol));
        match entry {
            None => {
                return Err(SdkError::known(format!(
                    "InvalidArgumentException: '{symbol}' is not an entry of '{}'",
                    self.state.name
                )))
            }
            Some(entry) if !entry.available => {
                return Err(SdkError::known(format!(
                    "AccessException: entry '{symbol}' of '{}' is not available",
                    self.state.name
                )))
            }
            Some(_) => {}
        }
        match &mut *FakeNode::value(self) {
            Value::Enumeration(current) => {
                *current = symbol.to_string();
                Ok(())
            }
            _ => Err(self.kind_mismatch("an enumeration")),
        }
    }

    fn entries(&self) -> SdkResult<Vec<Arc<dyn Node>>> {
        self.check("enumeration.entries")?;
        Ok(self
            .state
            .entries
            .iter()
            .map(|entry| FakeNode::handle(entry, &self.world) as Arc<dyn Node>)
            .collect())
    }

    fn settable_values(&self) -> SdkResult<Vec<String>> {
        self.check("enumeration.settable_values")?;
        Ok(self
            .state
            .entries
            .iter()
            .filter(|entry| entry.available)
            .filter_map(|entry| match &*entry.value() {
                Value::EnumEntry(symbol) => Some(symbol.clone()),
                _ => None,
            })
            .collect())
    }
}

impl CommandNode for FakeNode {
    fn execute(&self) -> SdkResult<()> {
        self.check("command.execute")?;
        match &mut *FakeNode::value(self) {
            Value::Command { executed } => {
                *executed += 1;
                Ok(())
            }
            _ => Err(self.kind_mismatch("a command")),
        }
    }
}

/// Node map built from scenario node specs.
///
/// The map a device owns is uncounted; [`FakeNodeMap::handle`] gives out
/// counted views onto the same nodes.
pub struct FakeNodeMap {
    nodes: Arc<Vec<Arc<NodeState>>>,
    world: Arc<World>,
    _token: Option<AllocationToken>,
}

impl FakeNodeMap {
    pub(crate) fn new(specs: &[FakeNodeSpec], namespace: &'static str, world: &Arc<World>) -> Self {
        Self {
            nodes: Arc::new(
                specs
                    .iter()
                    .map(|spec| Arc::new(NodeState::from_spec(spec, namespace)))
                    .collect(),
            ),
            world: world.clone(),
            _token: None,
        }
    }

    /// A map outside any fake SDK, with nothing injected.
    pub fn detached(specs: &[FakeNodeSpec]) -> Self {
        Self::new(specs, "Device", &Arc::new(World::default()))
    }

    pub(crate) fn handle(&self) -> Arc<dyn NodeMap> {
        Arc::new(Self {
            nodes: self.nodes.clone(),
            world: self.world.clone(),
            _token: Some(self.world.track()),
        })
    }

    pub fn find(&self, name: &str) -> Option<Arc<FakeNode>> {
        self.nodes
            .iter()
            .find(|node| node.name == name)
            .map(|node| FakeNode::handle(node, &self.world))
    }
}

impl NodeMap for FakeNodeMap {
    fn nodes(&self) -> SdkResult<Vec<Arc<dyn Node>>> {
        self.world.check("node_map.nodes")?;
        Ok(self
            .nodes
            .iter()
            .map(|node| FakeNode::handle(node, &self.world) as Arc<dyn Node>)
            .collect())
    }

    fn node(&self, name: &str) -> SdkResult<Option<Arc<dyn Node>>> {
        self.world.check("node_map.node")?;
        Ok(self.find(name).map(|node| node as Arc<dyn Node>))
    }
}
