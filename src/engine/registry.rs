//! Element Registry - Index allocation and per-element state.
//!
//! Manages the lifecycle of element indices:
//! - ID ↔ Index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - Parent context stack for nested element creation
//! - Layout rect, focusability and stacking per element
//! - Allocation order (indices are recycled, the sequence is not)

use std::cell::RefCell;
use std::collections::HashMap;

use crate::state::focus;
use crate::types::Rect;

// =============================================================================
// Types
// =============================================================================

/// Properties for a new element.
#[derive(Debug, Clone, Default)]
pub struct ElementProps {
    /// Explicit element ID. Generated when absent.
    pub id: Option<String>,
    /// Layout rect in viewport coordinates.
    pub rect: Rect,
    /// Whether the element can receive focus.
    pub focusable: bool,
    /// Stacking order relative to the parent. Higher is on top.
    pub z_index: i32,
}

#[derive(Debug, Clone)]
struct ElementRecord {
    id: String,
    parent: Option<usize>,
    rect: Rect,
    focusable: bool,
    z_index: i32,
    sequence: u64,
}

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map element ID to index.
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Live elements by index.
    static ELEMENTS: RefCell<HashMap<usize, ElementRecord>> = RefCell::new(HashMap::new());

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique IDs.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Stack of parent indices for nested element creation.
    static PARENT_STACK: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Monotonic allocation counter.
    static NEXT_SEQUENCE: RefCell<u64> = const { RefCell::new(0) };
}

// =============================================================================
// Parent Context Stack
// =============================================================================

/// Get current parent index (None at root).
pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

/// Push a parent index onto the stack.
pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index));
}

/// Pop a parent index from the stack.
pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// Run `f` with `index` as the parent of every element it creates.
pub fn with_parent<R>(index: usize, f: impl FnOnce() -> R) -> R {
    push_parent_context(index);
    let result = f();
    pop_parent_context();
    result
}

// =============================================================================
// Allocation
// =============================================================================

/// Allocate an element under the current parent context.
///
/// Allocating an ID that is already live returns the existing index.
pub fn allocate_element(props: ElementProps) -> usize {
    allocate_with_parent(props, get_current_parent_index())
}

/// Allocate an element at the root, ignoring the parent context.
pub fn allocate_root_element(props: ElementProps) -> usize {
    allocate_with_parent(props, None)
}

fn allocate_with_parent(props: ElementProps, parent: Option<usize>) -> usize {
    let id = match props.id {
        Some(id) => id,
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("e{}", *counter);
            *counter += 1;
            id
        }),
    };

    if let Some(index) = get_index(&id) {
        return index;
    }

    let index = FREE_INDICES.with(|free| {
        free.borrow_mut().pop().unwrap_or_else(|| {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        })
    });

    let sequence = NEXT_SEQUENCE.with(|next| {
        let mut next = next.borrow_mut();
        *next += 1;
        *next
    });

    let record = ElementRecord {
        id: id.clone(),
        parent,
        rect: props.rect,
        focusable: props.focusable,
        z_index: props.z_index,
        sequence,
    };

    ID_TO_INDEX.with(|map| map.borrow_mut().insert(id, index));
    ELEMENTS.with(|elements| elements.borrow_mut().insert(index, record));

    index
}

/// Release an element back to the pool.
///
/// Also recursively releases all children. Focus on a released element is
/// cleared so the recycled index does not inherit it.
pub fn release_element(index: usize) {
    if !is_allocated(index) {
        return;
    }

    for child in get_children(index) {
        release_element(child);
    }

    let Some(record) = ELEMENTS.with(|elements| elements.borrow_mut().remove(&index)) else {
        return;
    };
    ID_TO_INDEX.with(|map| {
        map.borrow_mut().remove(&record.id);
    });
    FREE_INDICES.with(|free| free.borrow_mut().push(index));

    if focus::is_focused(index) {
        focus::blur();
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Get index for an element ID.
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Get ID for an index.
pub fn get_id(index: usize) -> Option<String> {
    ELEMENTS.with(|elements| elements.borrow().get(&index).map(|e| e.id.clone()))
}

/// Check if an index is currently allocated.
pub fn is_allocated(index: usize) -> bool {
    ELEMENTS.with(|elements| elements.borrow().contains_key(&index))
}

/// All allocated indices in ascending order.
pub fn get_allocated_indices() -> Vec<usize> {
    let mut indices: Vec<usize> =
        ELEMENTS.with(|elements| elements.borrow().keys().copied().collect());
    indices.sort_unstable();
    indices
}

pub fn get_allocated_count() -> usize {
    ELEMENTS.with(|elements| elements.borrow().len())
}

pub fn get_parent(index: usize) -> Option<usize> {
    ELEMENTS.with(|elements| elements.borrow().get(&index).and_then(|e| e.parent))
}

/// Direct children of an element, in allocation order.
pub fn get_children(index: usize) -> Vec<usize> {
    let mut children: Vec<usize> = ELEMENTS.with(|elements| {
        elements
            .borrow()
            .iter()
            .filter(|(_, e)| e.parent == Some(index))
            .map(|(&i, _)| i)
            .collect()
    });
    children.sort_unstable();
    children
}

/// Layout rect of an element, if allocated.
pub fn get_rect(index: usize) -> Option<Rect> {
    ELEMENTS.with(|elements| elements.borrow().get(&index).map(|e| e.rect))
}

/// Update the layout rect of an element. Ignored for unallocated indices.
pub fn set_rect(index: usize, rect: Rect) {
    ELEMENTS.with(|elements| {
        if let Some(element) = elements.borrow_mut().get_mut(&index) {
            element.rect = rect;
        }
    });
}

pub fn is_focusable(index: usize) -> bool {
    ELEMENTS.with(|elements| {
        elements
            .borrow()
            .get(&index)
            .map(|e| e.focusable)
            .unwrap_or(false)
    })
}

pub fn set_focusable(index: usize, focusable: bool) {
    ELEMENTS.with(|elements| {
        if let Some(element) = elements.borrow_mut().get_mut(&index) {
            element.focusable = focusable;
        }
    });
}

/// Allocation sequence of the live element at `index`. Later allocations
/// have larger values, even on recycled indices.
pub fn allocation_order(index: usize) -> Option<u64> {
    ELEMENTS.with(|elements| elements.borrow().get(&index).map(|e| e.sequence))
}

/// Stacking order including every ancestor's z-index.
pub fn effective_z_index(index: usize) -> i32 {
    let mut z = 0;
    let mut current = Some(index);
    while let Some(i) = current {
        let Some((own, parent)) =
            ELEMENTS.with(|elements| elements.borrow().get(&i).map(|e| (e.z_index, e.parent)))
        else {
            break;
        };
        z += own;
        current = parent;
    }
    z
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    ELEMENTS.with(|elements| elements.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    NEXT_SEQUENCE.with(|next| *next.borrow_mut() = 0);
}
