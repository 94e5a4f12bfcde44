//! The current-graph slot every node constructor reads implicitly.
//!
//! Thread-local rather than a single process-wide static, mirroring the
//! thread-local RNG in [`crate::runtime`]: each thread gets its own current
//! graph, with no cross-thread visibility or locking.

use std::cell::RefCell;

use crate::autograd::graph::Graph;
use crate::error::{CgError, CgResult};

thread_local! {
    static CURRENT: RefCell<Option<Graph>> = RefCell::new(None);
}

/// Bind `graph` as the current graph for this thread.
pub fn set_graph(graph: Graph) {
    CURRENT.with(|slot| {
        *slot.borrow_mut() = Some(graph);
    });
}

/// The current graph. Fails with `NoActiveGraph` if none has been set.
pub fn current_graph() -> CgResult<Graph> {
    CURRENT.with(|slot| slot.borrow().clone().ok_or(CgError::NoActiveGraph))
}
