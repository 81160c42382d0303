use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::RangeInclusive;
use std::os::raw::c_void;

use vision_boundary_camera::capi::node::*;
use vision_boundary_camera::{InterfaceType, Visibility};
use vision_boundary_core::TaggedResult;

use super::{c_name, c_string, push_handle, push_name};
use crate::error::{check, Error, Result};
use crate::text::read_text;

pub struct NodeMap {
    raw: *mut NodeMapHandle,
}

unsafe impl Send for NodeMap {}

impl NodeMap {
    pub(crate) fn from_raw(raw: *mut NodeMapHandle) -> Self {
        Self { raw }
    }

    pub fn node(&self, name: &str) -> Result<Node> {
        let key = c_name(name)?;
        let raw = check(unsafe { vb_cam_node_map_node(self.raw, key.as_ptr()) })
            .map_err(|e| e.named(name))?;
        Ok(Node { raw })
    }

    pub fn nodes(&self) -> Result<Vec<Node>> {
        let mut found: Vec<*mut NodeHandle> = Vec::new();
        let status = check(unsafe {
            vb_cam_node_map_nodes(
                self.raw,
                Some(push_handle::<NodeHandle>),
                &mut found as *mut Vec<*mut NodeHandle> as *mut c_void,
            )
        });
        let nodes: Vec<Node> = found.into_iter().map(|raw| Node { raw }).collect();
        status?;
        Ok(nodes)
    }
}

impl Drop for NodeMap {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_node_map_delete(self.raw) };
    }
}

type Downcast<H> = unsafe extern "C" fn(*mut *mut NodeHandle) -> TaggedResult<*mut H>;

/// A parameter node of unknown type.
///
/// The typed views are obtained by consuming the node with one of the
/// `into_*` conversions.
pub struct Node {
    raw: *mut NodeHandle,
}

unsafe impl Send for Node {}

impl Node {
    pub fn name(&self, fully_qualified: bool) -> Result<String> {
        read_text(|dest, capacity| unsafe {
            vb_cam_node_name(self.raw, fully_qualified, dest, capacity)
        })
    }

    pub fn visibility(&self) -> Result<Visibility> {
        check(unsafe { vb_cam_node_visibility(self.raw) })
    }

    pub fn principal_interface_type(&self) -> Result<InterfaceType> {
        check(unsafe { vb_cam_node_principal_interface_type(self.raw) })
    }

    fn downcast<H>(self, cast: Downcast<H>) -> Result<*mut H> {
        let name = self.name(true).unwrap_or_default();
        let mut this = ManuallyDrop::new(self);
        // The call nulls the slot whether or not the cast succeeds, so the
        // node must not be deleted again.
        match check(unsafe { cast(&mut this.raw) }) {
            Err(Error::InvalidResult) => Err(Error::WrongNodeType(name)),
            other => other,
        }
    }

    pub fn into_integer(self) -> Result<IntegerNode> {
        Ok(IntegerNode {
            raw: self.downcast(vb_cam_node_to_integer)?,
        })
    }

    pub fn into_boolean(self) -> Result<BooleanNode> {
        Ok(BooleanNode {
            raw: self.downcast(vb_cam_node_to_boolean)?,
        })
    }

    pub fn into_float(self) -> Result<FloatNode> {
        Ok(FloatNode {
            raw: self.downcast(vb_cam_node_to_float)?,
        })
    }

    pub fn into_string(self) -> Result<StringNode> {
        Ok(StringNode {
            raw: self.downcast(vb_cam_node_to_string)?,
        })
    }

    pub fn into_enumeration(self) -> Result<EnumerationNode> {
        Ok(EnumerationNode {
            raw: self.downcast(vb_cam_node_to_enumeration)?,
        })
    }

    pub fn into_command(self) -> Result<CommandNode> {
        Ok(CommandNode {
            raw: self.downcast(vb_cam_node_to_command)?,
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name(true).ok())
            .field("interface", &self.principal_interface_type().ok())
            .finish()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let _ = unsafe { vb_cam_node_delete(self.raw) };
    }
}

macro_rules! typed_node {
    ($(#[$meta:meta])* $name:ident($handle:ty) => $delete:ident) => {
        $(#[$meta])*
        pub struct $name {
            raw: *mut $handle,
        }

        unsafe impl Send for $name {}

        impl Drop for $name {
            fn drop(&mut self) {
                let _ = unsafe { $delete(self.raw) };
            }
        }
    };
}

typed_node!(IntegerNode(IntegerNodeHandle) => vb_cam_integer_node_delete);
typed_node!(BooleanNode(BooleanNodeHandle) => vb_cam_boolean_node_delete);
typed_node!(FloatNode(FloatNodeHandle) => vb_cam_float_node_delete);
typed_node!(StringNode(StringNodeHandle) => vb_cam_string_node_delete);
typed_node!(
    /// Enumeration parameter, read and written by entry symbol.
    EnumerationNode(EnumerationNodeHandle) => vb_cam_enumeration_node_delete
);
typed_node!(CommandNode(CommandNodeHandle) => vb_cam_command_node_delete);

impl IntegerNode {
    pub fn value(&self) -> Result<i64> {
        check(unsafe { vb_cam_integer_node_value(self.raw) })
    }

    pub fn set_value(&mut self, value: i64) -> Result<()> {
        check(unsafe { vb_cam_integer_node_set_value(self.raw, value) })?;
        Ok(())
    }

    pub fn range(&self) -> Result<RangeInclusive<i64>> {
        let range = check(unsafe { vb_cam_integer_node_range(self.raw) })?;
        Ok(range.min..=range.max)
    }

    pub fn unit(&self) -> Result<String> {
        read_text(|dest, capacity| unsafe { vb_cam_integer_node_unit(self.raw, dest, capacity) })
    }
}

impl BooleanNode {
    pub fn value(&self) -> Result<bool> {
        check(unsafe { vb_cam_boolean_node_value(self.raw) })
    }

    pub fn set_value(&mut self, value: bool) -> Result<()> {
        check(unsafe { vb_cam_boolean_node_set_value(self.raw, value) })?;
        Ok(())
    }
}

impl FloatNode {
    pub fn value(&self) -> Result<f64> {
        check(unsafe { vb_cam_float_node_value(self.raw) })
    }

    pub fn set_value(&mut self, value: f64) -> Result<()> {
        check(unsafe { vb_cam_float_node_set_value(self.raw, value) })?;
        Ok(())
    }

    pub fn range(&self) -> Result<RangeInclusive<f64>> {
        let range = check(unsafe { vb_cam_float_node_range(self.raw) })?;
        Ok(range.min..=range.max)
    }

    pub fn unit(&self) -> Result<String> {
        read_text(|dest, capacity| unsafe { vb_cam_float_node_unit(self.raw, dest, capacity) })
    }
}

impl StringNode {
    pub fn value(&self) -> Result<String> {
        read_text(|dest, capacity| unsafe { vb_cam_string_node_value(self.raw, dest, capacity) })
    }

    pub fn set_value(&mut self, value: &str) -> Result<()> {
        let value = c_string(value)?;
        check(unsafe { vb_cam_string_node_set_value(self.raw, value.as_ptr()) })?;
        Ok(())
    }
}

impl EnumerationNode {
    pub fn value(&self) -> Result<String> {
        read_text(|dest, capacity| unsafe {
            vb_cam_enumeration_node_value(self.raw, dest, capacity)
        })
    }

    pub fn set_value(&mut self, symbol: &str) -> Result<()> {
        let symbol = c_string(symbol)?;
        check(unsafe { vb_cam_enumeration_node_set_value(self.raw, symbol.as_ptr()) })?;
        Ok(())
    }

    /// Symbols the node accepts right now.
    pub fn settable_values(&self) -> Result<Vec<String>> {
        let mut symbols: Vec<String> = Vec::new();
        check(unsafe {
            vb_cam_enumeration_node_settable_values(
                self.raw,
                Some(push_name),
                &mut symbols as *mut Vec<String> as *mut c_void,
            )
        })?;
        Ok(symbols)
    }

    /// Entry nodes, one per symbol.
    pub fn entries(&self) -> Result<Vec<Node>> {
        let mut found: Vec<*mut NodeHandle> = Vec::new();
        let status = check(unsafe {
            vb_cam_enumeration_node_entries(
                self.raw,
                Some(push_handle::<NodeHandle>),
                &mut found as *mut Vec<*mut NodeHandle> as *mut c_void,
            )
        });
        let entries: Vec<Node> = found.into_iter().map(|raw| Node { raw }).collect();
        status?;
        Ok(entries)
    }
}

impl CommandNode {
    pub fn execute(&self) -> Result<()> {
        check(unsafe { vb_cam_command_node_execute(self.raw) })?;
        Ok(())
    }
}
