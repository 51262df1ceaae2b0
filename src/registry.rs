//! The frozen method registry: one descriptor per wire method name, binding
//! the name to its direction and to the shapes of its parameters and, for
//! requests, its result and error payloads.
//!
//! Registration happens once through [`RegistryBuilder`] before any message
//! traffic; [`Registry`] itself is immutable, so unlimited concurrent readers
//! need no locking.

use std::collections::{HashMap, hash_map};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::shape::Shape;


/// Whether a method expects exactly one reply or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "lowercase")]
pub enum Direction {
    Request,
    Notification,
}

/// Result and error shapes of a request method. Exactly one of the two must
/// structurally match any reply payload.
#[derive(Debug, Clone)]
pub struct ReplyShape {
    pub result: Shape,
    pub error: Shape,
}

/// Registry entry for one protocol method.
///
/// A notification carries no [`ReplyShape`], so the invariant that
/// notifications have no result or error shape holds by construction.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Shape,
    reply: Option<ReplyShape>,
}

impl MethodDescriptor {
    /// The wire method name, case-sensitive and `/`-namespaced.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        if self.reply.is_some() {
            Direction::Request
        } else {
            Direction::Notification
        }
    }

    pub fn params(&self) -> &Shape {
        &self.params
    }

    pub fn reply(&self) -> Option<&ReplyShape> {
        self.reply.as_ref()
    }
}

/// One-time, single-threaded construction phase of a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    methods: HashMap<String, MethodDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request method expecting exactly one reply.
    pub fn request(
        mut self,
        name: impl Into<String>,
        params: Shape,
        result: Shape,
        error: Shape,
    ) -> Result<Self> {
        self.insert(MethodDescriptor {
            name: name.into(),
            params,
            reply: Some(ReplyShape { result, error }),
        })?;
        Ok(self)
    }

    /// Registers a fire-and-forget notification method.
    pub fn notification(mut self, name: impl Into<String>, params: Shape) -> Result<Self> {
        self.insert(MethodDescriptor {
            name: name.into(),
            params,
            reply: None,
        })?;
        Ok(self)
    }

    fn insert(&mut self, descriptor: MethodDescriptor) -> Result<()> {
        match self.methods.entry(descriptor.name.clone()) {
            hash_map::Entry::Occupied(e) => Err(Error::DuplicateMethod(e.key().clone())),
            hash_map::Entry::Vacant(e) => {
                debug!(
                    method = %descriptor.name,
                    direction = %descriptor.direction(),
                    "registered method"
                );
                e.insert(descriptor);
                Ok(())
            }
        }
    }

    /// Freezes the table. No registration is possible afterwards.
    pub fn build(self) -> Registry {
        Registry {
            methods: self.methods,
        }
    }
}

/// Immutable mapping from method name to [`MethodDescriptor`].
#[derive(Debug)]
pub struct Registry {
    methods: HashMap<String, MethodDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn lookup(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Enumerates every registered descriptor, for tooling and tests.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Validates `params` against the named request method and yields an
    /// envelope ready for transport.
    pub fn build_request(&self, name: &str, params: Value) -> Result<Envelope> {
        let (descriptor, _) = self.request_descriptor(name)?;
        let payload = descriptor.params.encode(params)?;
        Ok(Envelope {
            method: descriptor.name.clone(),
            direction: Direction::Request,
            payload,
        })
    }

    /// Validates `params` against the named notification method and yields an
    /// envelope ready for transport.
    pub fn build_notification(&self, name: &str, params: Value) -> Result<Envelope> {
        let descriptor = self.notification_descriptor(name)?;
        let payload = descriptor.params.encode(params)?;
        Ok(Envelope {
            method: descriptor.name.clone(),
            direction: Direction::Notification,
            payload,
        })
    }

    /// Classifies the reply payload of a prior request as a success result or
    /// an error.
    ///
    /// Exactly one of the method's result and error shapes must match. A
    /// payload matching both is an ambiguous reply and fails with
    /// [`Error::ProtocolViolation`]; a payload matching neither fails with
    /// the mismatch against the result shape.
    pub fn accept_result(&self, name: &str, wire: Value) -> Result<Reply> {
        let (_, shapes) = self.request_descriptor(name)?;
        match (
            shapes.result.conformance(&wire),
            shapes.error.conformance(&wire),
        ) {
            (Ok(()), Err(_)) => Ok(Reply::Success(wire)),
            (Err(_), Ok(())) => Ok(Reply::Failure(wire)),
            (Ok(()), Ok(())) => {
                warn!(method = name, "reply matches both result and error shape");
                Err(Error::ProtocolViolation {
                    method: name.to_string(),
                    wire,
                })
            }
            (Err(mismatch), Err(_)) => {
                warn!(method = name, %mismatch, "reply matches neither result nor error shape");
                Err(Error::Shape(mismatch))
            }
        }
    }

    fn request_descriptor(&self, name: &str) -> Result<(&MethodDescriptor, &ReplyShape)> {
        let descriptor = self
            .lookup(name)
            .ok_or_else(|| Error::MethodNotFound(name.to_string()))?;
        match &descriptor.reply {
            Some(shapes) => Ok((descriptor, shapes)),
            None => Err(Error::WrongDirection {
                name: name.to_string(),
                expected: Direction::Request,
                actual: Direction::Notification,
            }),
        }
    }

    fn notification_descriptor(&self, name: &str) -> Result<&MethodDescriptor> {
        let descriptor = self
            .lookup(name)
            .ok_or_else(|| Error::MethodNotFound(name.to_string()))?;
        if descriptor.reply.is_some() {
            return Err(Error::WrongDirection {
                name: name.to_string(),
                expected: Direction::Notification,
                actual: Direction::Request,
            });
        }
        Ok(descriptor)
    }
}

/// A validated (method, payload) pair ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub method: String,
    #[serde(skip)]
    pub direction: Direction,
    #[serde(rename = "params")]
    pub payload: Value,
}

/// Outcome of [`Registry::accept_result`]: a decoded success result or a
/// decoded error payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(Value),
    Failure(Value),
}

/// Lifecycle of one outgoing request.
///
/// `Completed` and `Failed` carry the decoded reply payload and are terminal,
/// as is `Cancelled`. Transition methods return whether the transition
/// applied; terminal states refuse all further transitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Sent,
    AwaitingReply,
    Completed(Value),
    Failed(Value),
    Cancelled,
}

impl RequestState {
    /// `Sent → AwaitingReply`, once the transport has taken the envelope.
    #[must_use]
    pub fn await_reply(&mut self) -> bool {
        match self {
            Self::Sent => {
                *self = Self::AwaitingReply;
                true
            }
            _ => false,
        }
    }

    /// Settles the request with a classified reply.
    #[must_use]
    pub fn settle(&mut self, reply: Reply) -> bool {
        match self {
            Self::Sent | Self::AwaitingReply => {
                *self = match reply {
                    Reply::Success(result) => Self::Completed(result),
                    Reply::Failure(error) => Self::Failed(error),
                };
                true
            }
            Self::Completed(_) | Self::Failed(_) | Self::Cancelled => false,
        }
    }

    /// Cancellation is driven by the transport; it is refused once the
    /// request has settled.
    #[must_use]
    pub fn cancel(&mut self) -> bool {
        match self {
            Self::Sent | Self::AwaitingReply => {
                *self = Self::Cancelled;
                true
            }
            Self::Completed(_) | Self::Failed(_) | Self::Cancelled => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed(_) | Self::Failed(_) | Self::Cancelled
        )
    }
}

/// Lifecycle of one outgoing notification. `Delivered` is an assumption, not
/// an acknowledgment; the protocol has no notification-level reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationState {
    #[default]
    Sent,
    Delivered,
}

impl NotificationState {
    pub fn delivered(&mut self) {
        *self = Self::Delivered;
    }
}
