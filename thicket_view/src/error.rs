// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use crate::ViewId;

/// A rejected tree operation.
///
/// None of these are fatal; the tree is left unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The id does not refer to a live view.
    #[error("view {0:?} is not alive")]
    StaleView(ViewId),
    /// The operation needs a container and the view is a plain element.
    #[error("view {0:?} is not a container")]
    NotAContainer(ViewId),
    /// A container cannot be added to itself.
    #[error("view {0:?} cannot contain itself")]
    SelfReference(ViewId),
    /// The child is already in this container.
    #[error("view {child:?} is already a child of {parent:?}")]
    AlreadyChild {
        /// The container.
        parent: ViewId,
        /// The child.
        child: ViewId,
    },
    /// The child is an ancestor of the container.
    #[error("adding {child:?} to {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// The container.
        parent: ViewId,
        /// The child.
        child: ViewId,
    },
    /// The view is not a child of this container.
    #[error("view {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The container.
        parent: ViewId,
        /// The view.
        child: ViewId,
    },
    /// The view is not flagged as a pop-up.
    #[error("view {0:?} is not a pop-up")]
    NotPopup(ViewId),
}

/// A device failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The device was lost; resources must be released and recreated.
    #[error("graphics device lost")]
    Lost,
    /// The device cannot be created right now.
    #[error("graphics device unavailable")]
    Unavailable,
}
