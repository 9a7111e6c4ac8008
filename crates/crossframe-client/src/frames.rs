//! Frame ownership chain and origin-frame naming.
//!
//! Messages to the host shell must name the frame they originate from:
//! the frame sitting directly below the top window. The embedder
//! describes the ownership chain as data, bottom-up, and the walk stops
//! early when a cross-origin boundary makes a frame's name unreadable,
//! keeping the last name it could see.

/// One frame in the ownership chain, as seen from the embedded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameAccess {
    /// The frame's name is readable.
    Named(String),
    /// Reading the frame is denied by the same-origin policy.
    Denied,
}

/// The chain of frames from the current window up to (and excluding)
/// the top window. The first element is the current window itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameChain {
    frames: Vec<FrameAccess>,
}

impl FrameChain {
    /// Creates a chain from the bottom-up frame list.
    pub fn new(frames: Vec<FrameAccess>) -> Self {
        Self { frames }
    }

    /// A chain for a page framed directly below the top window.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            frames: vec![FrameAccess::Named(name.into())],
        }
    }

    /// Walks the chain and returns the name of the frame directly
    /// below the top window.
    ///
    /// Stops at the first denied frame and returns the last name read
    /// before it; an empty chain yields an empty name.
    pub fn origin_frame_name(&self) -> String {
        let mut last_name = String::new();
        for frame in &self.frames {
            match frame {
                FrameAccess::Named(name) => last_name = name.clone(),
                FrameAccess::Denied => break,
            }
        }
        last_name
    }
}
