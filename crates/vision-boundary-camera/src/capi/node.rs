//! Node maps, generic nodes and the typed node interfaces.
//!
//! A typed handle is obtained by *consuming* a generic node handle through
//! one of the `vb_cam_node_to_*` downcasts. The downcast nulls the caller's
//! slot whether or not the node implements the interface, so the generic
//! handle must not be deleted afterwards.

use std::ffi::CString;
use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use vision_boundary_core::callback::{self, ItemCallback};
use vision_boundary_core::text::borrow_c_str;
use vision_boundary_core::{
    handle, translate, translate_unit, BoundaryEnum, Done, Fault, TaggedResult, ValueRange,
};

use super::deliver_text;
use crate::sdk::{
    BooleanNode, CommandNode, EnumerationNode, FloatNode, IntegerNode, Node, NodeMap, StringNode,
};
use crate::types::{InterfaceType, Visibility};

pub struct NodeMapHandle(Arc<dyn NodeMap>);

impl NodeMapHandle {
    pub fn new(map: Arc<dyn NodeMap>) -> Self {
        Self(map)
    }
}

pub struct NodeHandle(Arc<dyn Node>);

pub struct IntegerNodeHandle(Arc<dyn IntegerNode>);

pub struct BooleanNodeHandle(Arc<dyn BooleanNode>);

pub struct FloatNodeHandle(Arc<dyn FloatNode>);

pub struct StringNodeHandle(Arc<dyn StringNode>);

pub struct EnumerationNodeHandle(Arc<dyn EnumerationNode>);

pub struct CommandNodeHandle(Arc<dyn CommandNode>);

unsafe fn deliver_nodes(
    nodes: Vec<Arc<dyn Node>>,
    callback: Option<ItemCallback<*mut NodeHandle>>,
    user_data: *mut c_void,
) -> Result<usize, Fault> {
    let callback = callback::require(callback)?;
    callback::for_each_until_failure(nodes, |node| {
        Ok(callback(user_data, handle::into_handle(NodeHandle(node))))
    })
}

/// Consume the node handle in `slot` and wrap the interface `cast` finds.
unsafe fn downcast<H>(
    slot: *mut *mut NodeHandle,
    interface: &'static str,
    cast: impl FnOnce(Arc<dyn Node>) -> Option<H>,
) -> Result<*mut H, Fault> {
    let node = handle::take_slot(slot)?;
    cast(node.0)
        .map(handle::into_handle)
        .ok_or(Fault::InvalidResult(interface))
}

/// Call `callback` with an owned handle for every node of the map.
///
/// # Safety
/// `map` must be null or a live node map handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_map_nodes(
    map: *const NodeMapHandle,
    callback: Option<ItemCallback<*mut NodeHandle>>,
    user_data: *mut c_void,
) -> TaggedResult<usize> {
    translate(|| {
        let map = handle::borrow(map)?;
        callback::require(callback)?;
        deliver_nodes(map.0.nodes()?, callback, user_data)
    })
}

/// Look a node up by name. An unknown name is `NameNotFound`.
///
/// # Safety
/// `map` must be null or live; `name` null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_map_node(
    map: *const NodeMapHandle,
    name: *const c_char,
) -> TaggedResult<*mut NodeHandle> {
    translate(|| {
        let map = handle::borrow(map)?;
        let name = borrow_c_str(name)?;
        let node = map
            .0
            .node(&name)?
            .ok_or_else(|| Fault::NameNotFound(name.to_string()))?;
        Ok(handle::into_handle(NodeHandle(node)))
    })
}

/// # Safety
/// `map` must be null or a live node map handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_map_delete(map: *mut NodeMapHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(map))
}

/// # Safety
/// `node` must be null or live; `dest` null or valid for `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_name(
    node: *const NodeHandle,
    fully_qualified: bool,
    dest: *mut c_char,
    capacity: usize,
) -> TaggedResult<usize> {
    translate(|| {
        let name = handle::borrow(node)?.0.name(fully_qualified)?;
        deliver_text(&name, dest, capacity)
    })
}

/// # Safety
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_visibility(node: *const NodeHandle) -> TaggedResult<Visibility> {
    translate(|| Visibility::from_native(handle::borrow(node)?.0.visibility()?))
}

/// # Safety
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_principal_interface_type(
    node: *const NodeHandle,
) -> TaggedResult<InterfaceType> {
    translate(|| InterfaceType::from_native(handle::borrow(node)?.0.principal_interface_type()?))
}

/// # Safety
/// `node` must be null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_delete(node: *mut NodeHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(node))
}

/// Consume `*node` as an integer node. `*node` is null afterwards; a node of
/// another interface is `InvalidResult`.
///
/// # Safety
/// `node` must be null or point to null or a live node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_to_integer(
    node: *mut *mut NodeHandle,
) -> TaggedResult<*mut IntegerNodeHandle> {
    translate(|| downcast(node, "integer node cast", |n| n.as_integer().map(IntegerNodeHandle)))
}

/// # Safety
/// As for [`vb_cam_node_to_integer`].
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_to_boolean(
    node: *mut *mut NodeHandle,
) -> TaggedResult<*mut BooleanNodeHandle> {
    translate(|| downcast(node, "boolean node cast", |n| n.as_boolean().map(BooleanNodeHandle)))
}

/// # Safety
/// As for [`vb_cam_node_to_integer`].
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_to_float(
    node: *mut *mut NodeHandle,
) -> TaggedResult<*mut FloatNodeHandle> {
    translate(|| downcast(node, "float node cast", |n| n.as_float().map(FloatNodeHandle)))
}

/// # Safety
/// As for [`vb_cam_node_to_integer`].
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_to_string(
    node: *mut *mut NodeHandle,
) -> TaggedResult<*mut StringNodeHandle> {
    translate(|| downcast(node, "string node cast", |n| n.as_string().map(StringNodeHandle)))
}

/// # Safety
/// As for [`vb_cam_node_to_integer`].
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_to_enumeration(
    node: *mut *mut NodeHandle,
) -> TaggedResult<*mut EnumerationNodeHandle> {
    translate(|| {
        downcast(node, "enumeration node cast", |n| {
            n.as_enumeration().map(EnumerationNodeHandle)
        })
    })
}

/// # Safety
/// As for [`vb_cam_node_to_integer`].
#[no_mangle]
pub unsafe extern "C" fn vb_cam_node_to_command(
    node: *mut *mut NodeHandle,
) -> TaggedResult<*mut CommandNodeHandle> {
    translate(|| downcast(node, "command node cast", |n| n.as_command().map(CommandNodeHandle)))
}

// Integer

/// # Safety
/// `node` must be null or a live integer node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_integer_node_value(node: *const IntegerNodeHandle) -> TaggedResult<i64> {
    translate(|| Ok(handle::borrow(node)?.0.value()?))
}

/// # Safety
/// `node` must be null or a live integer node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_integer_node_set_value(
    node: *const IntegerNodeHandle,
    value: i64,
) -> TaggedResult<Done> {
    translate_unit(|| Ok(handle::borrow(node)?.0.set_value(value)?))
}

/// # Safety
/// `node` must be null or a live integer node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_integer_node_range(
    node: *const IntegerNodeHandle,
) -> TaggedResult<ValueRange<i64>> {
    translate(|| {
        let node = &handle::borrow(node)?.0;
        Ok(ValueRange {
            min: node.min()?,
            max: node.max()?,
        })
    })
}

/// Copy the physical unit, empty for a unitless value.
///
/// # Safety
/// `node` must be null or live; `dest` null or valid for `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_integer_node_unit(
    node: *const IntegerNodeHandle,
    dest: *mut c_char,
    capacity: usize,
) -> TaggedResult<usize> {
    translate(|| {
        let unit = handle::borrow(node)?.0.unit()?;
        deliver_text(&unit, dest, capacity)
    })
}

/// # Safety
/// `node` must be null or a live integer node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_integer_node_delete(node: *mut IntegerNodeHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(node))
}

// Boolean

/// # Safety
/// `node` must be null or a live boolean node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_boolean_node_value(node: *const BooleanNodeHandle) -> TaggedResult<bool> {
    translate(|| Ok(handle::borrow(node)?.0.value()?))
}

/// # Safety
/// `node` must be null or a live boolean node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_boolean_node_set_value(
    node: *const BooleanNodeHandle,
    value: bool,
) -> TaggedResult<Done> {
    translate_unit(|| Ok(handle::borrow(node)?.0.set_value(value)?))
}

/// # Safety
/// `node` must be null or a live boolean node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_boolean_node_delete(node: *mut BooleanNodeHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(node))
}

// Float

/// # Safety
/// `node` must be null or a live float node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_float_node_value(node: *const FloatNodeHandle) -> TaggedResult<f64> {
    translate(|| Ok(handle::borrow(node)?.0.value()?))
}

/// # Safety
/// `node` must be null or a live float node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_float_node_set_value(
    node: *const FloatNodeHandle,
    value: f64,
) -> TaggedResult<Done> {
    translate_unit(|| Ok(handle::borrow(node)?.0.set_value(value)?))
}

/// # Safety
/// `node` must be null or a live float node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_float_node_range(
    node: *const FloatNodeHandle,
) -> TaggedResult<ValueRange<f64>> {
    translate(|| {
        let node = &handle::borrow(node)?.0;
        Ok(ValueRange {
            min: node.min()?,
            max: node.max()?,
        })
    })
}

/// # Safety
/// As for [`vb_cam_integer_node_unit`].
#[no_mangle]
pub unsafe extern "C" fn vb_cam_float_node_unit(
    node: *const FloatNodeHandle,
    dest: *mut c_char,
    capacity: usize,
) -> TaggedResult<usize> {
    translate(|| {
        let unit = handle::borrow(node)?.0.unit()?;
        deliver_text(&unit, dest, capacity)
    })
}

/// # Safety
/// `node` must be null or a live float node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_float_node_delete(node: *mut FloatNodeHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(node))
}

// String

/// # Safety
/// `node` must be null or live; `dest` null or valid for `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_string_node_value(
    node: *const StringNodeHandle,
    dest: *mut c_char,
    capacity: usize,
) -> TaggedResult<usize> {
    translate(|| {
        let value = handle::borrow(node)?.0.value()?;
        deliver_text(&value, dest, capacity)
    })
}

/// # Safety
/// `node` must be null or live; `value` null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_string_node_set_value(
    node: *const StringNodeHandle,
    value: *const c_char,
) -> TaggedResult<Done> {
    translate_unit(|| {
        let node = handle::borrow(node)?;
        node.0.set_value(&borrow_c_str(value)?)?;
        Ok(())
    })
}

/// # Safety
/// `node` must be null or a live string node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_string_node_delete(node: *mut StringNodeHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(node))
}

// Enumeration

/// Copy the symbolic name of the current entry.
///
/// # Safety
/// `node` must be null or live; `dest` null or valid for `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_enumeration_node_value(
    node: *const EnumerationNodeHandle,
    dest: *mut c_char,
    capacity: usize,
) -> TaggedResult<usize> {
    translate(|| {
        let symbol = handle::borrow(node)?.0.value()?;
        deliver_text(&symbol, dest, capacity)
    })
}

/// # Safety
/// `node` must be null or live; `symbol` null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_enumeration_node_set_value(
    node: *const EnumerationNodeHandle,
    symbol: *const c_char,
) -> TaggedResult<Done> {
    translate_unit(|| {
        let node = handle::borrow(node)?;
        node.0.set_value(&borrow_c_str(symbol)?)?;
        Ok(())
    })
}

/// Call `callback` with each symbol that can currently be set. A symbol is
/// borrowed for the duration of its call.
///
/// # Safety
/// `node` must be null or a live enumeration node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_enumeration_node_settable_values(
    node: *const EnumerationNodeHandle,
    callback: Option<ItemCallback<*const c_char>>,
    user_data: *mut c_void,
) -> TaggedResult<usize> {
    translate(|| {
        let node = handle::borrow(node)?;
        let callback = callback::require(callback)?;
        let symbols = node.0.settable_values()?;
        callback::for_each_until_failure(symbols, |symbol| {
            let symbol = CString::new(symbol).map_err(|_| Fault::InvalidResult("entry symbol"))?;
            Ok(callback(user_data, symbol.as_ptr()))
        })
    })
}

/// Call `callback` with an owned node handle for every entry.
///
/// # Safety
/// `node` must be null or a live enumeration node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_enumeration_node_entries(
    node: *const EnumerationNodeHandle,
    callback: Option<ItemCallback<*mut NodeHandle>>,
    user_data: *mut c_void,
) -> TaggedResult<usize> {
    translate(|| {
        let node = handle::borrow(node)?;
        callback::require(callback)?;
        deliver_nodes(node.0.entries()?, callback, user_data)
    })
}

/// # Safety
/// `node` must be null or a live enumeration node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_enumeration_node_delete(
    node: *mut EnumerationNodeHandle,
) -> TaggedResult<Done> {
    translate_unit(|| handle::release(node))
}

// Command

/// # Safety
/// `node` must be null or a live command node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_command_node_execute(node: *const CommandNodeHandle) -> TaggedResult<Done> {
    translate_unit(|| Ok(handle::borrow(node)?.0.execute()?))
}

/// # Safety
/// `node` must be null or a live command node handle.
#[no_mangle]
pub unsafe extern "C" fn vb_cam_command_node_delete(node: *mut CommandNodeHandle) -> TaggedResult<Done> {
    translate_unit(|| handle::release(node))
}
