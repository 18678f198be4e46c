//! Ownership of the resume capability
//!
//! A stream can reopen its cursor only while it holds its factory. Once the
//! server reports cursor id `0` the factory is released and dropped, along
//! with anything it captured (sessions, client handles).

use super::types::ResumeFactory;
use std::fmt;

/// Whether a stream may still reopen its cursor
pub enum ResumeCapability<C> {
    /// The factory is held and may be invoked
    Armed(Box<dyn ResumeFactory<C>>),
    /// The factory has been dropped; the stream will never resume again
    Released,
}

impl<C> ResumeCapability<C> {
    pub fn armed(factory: impl ResumeFactory<C> + 'static) -> Self {
        Self::Armed(Box::new(factory))
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, ResumeCapability::Armed(_))
    }

    /// Drop the factory. Returns `true` if it was held.
    pub fn release(&mut self) -> bool {
        let was_armed = self.is_armed();
        *self = ResumeCapability::Released;
        was_armed
    }

    pub fn factory_mut(&mut self) -> Option<&mut (dyn ResumeFactory<C> + 'static)> {
        match self {
            ResumeCapability::Armed(factory) => Some(factory.as_mut()),
            ResumeCapability::Released => None,
        }
    }
}

impl<C> fmt::Debug for ResumeCapability<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeCapability::Armed(_) => write!(f, "Armed"),
            ResumeCapability::Released => write!(f, "Released"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::token::ResumeToken;
    use std::rc::Rc;

    #[test]
    fn test_release_drops_factory() {
        let session = Rc::new(());
        let captured = Rc::clone(&session);
        let mut capability: ResumeCapability<()> =
            ResumeCapability::armed(move |_: Option<&ResumeToken>| -> Result<()> {
                let _session = Rc::clone(&captured);
                Ok(())
            });

        assert!(capability.is_armed());
        assert_eq!(Rc::strong_count(&session), 2);

        assert!(capability.release());
        assert!(!capability.is_armed());
        assert_eq!(Rc::strong_count(&session), 1);

        assert!(!capability.release());
        assert!(capability.factory_mut().is_none());
    }

    #[test]
    fn test_factory_mut_invokes_factory() {
        let mut capability: ResumeCapability<u32> =
            ResumeCapability::armed(|token: Option<&ResumeToken>| -> Result<u32> {
                Ok(u32::from(token.is_some()))
            });

        let factory = capability.factory_mut().unwrap();
        assert_eq!(factory.resume(None).unwrap(), 0);
    }

    #[test]
    fn test_debug_output() {
        let mut capability: ResumeCapability<()> =
            ResumeCapability::armed(|_: Option<&ResumeToken>| -> Result<()> { Ok(()) });
        assert_eq!(format!("{capability:?}"), "Armed");
        capability.release();
        assert_eq!(format!("{capability:?}"), "Released");
    }
}
