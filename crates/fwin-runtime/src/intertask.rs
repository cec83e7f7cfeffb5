#![forbid(unsafe_code)]

//! Request/reply envelopes between the application thread and the pumps.
//!
//! Every request carries its own single-use reply channel, so a waiter only
//! ever sees its own answer. The [`Tag`] identifies the request in logs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use fwin_core::error::{Error, Result};

/// Request identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u64);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic tag allocator.
#[derive(Debug, Default)]
pub struct TagSource(AtomicU64);

impl TagSource {
    pub fn next(&self) -> Tag {
        Tag(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// A request of payload `P` expecting a reply of type `R`.
#[derive(Debug)]
pub struct Intertask<P, R> {
    pub tag: Tag,
    pub payload: P,
    reply: SyncSender<R>,
}

impl<P, R> Intertask<P, R> {
    /// Build a request and the receiver its reply will arrive on.
    pub fn new(tag: Tag, payload: P) -> (Self, Receiver<R>) {
        let (reply, rx) = mpsc::sync_channel(1);
        (
            Self {
                tag,
                payload,
                reply,
            },
            rx,
        )
    }

    /// Answer the request. A vanished requester is logged and ignored.
    pub fn respond(self, value: R) {
        if self.reply.send(value).is_err() {
            tracing::debug!(tag = %self.tag, "requester gone before reply");
        }
    }
}

/// Post `payload` on `tx` and block until the matching reply arrives.
///
/// Never call this with the runtime lock held.
pub fn request<P, R>(
    tx: &SyncSender<Intertask<P, R>>,
    tag: Tag,
    payload: P,
    who: &'static str,
) -> Result<R> {
    let (msg, rx) = Intertask::new(tag, payload);
    tracing::trace!(%tag, pump = who, "posting request");
    match tx.try_send(msg) {
        Ok(()) => {}
        Err(TrySendError::Full(msg)) => {
            tx.send(msg).map_err(|_| Error::Disconnected(who))?;
        }
        Err(TrySendError::Disconnected(_)) => return Err(Error::Disconnected(who)),
    }
    let reply = rx.recv().map_err(|_| Error::Disconnected(who))?;
    tracing::trace!(%tag, pump = who, "reply received");
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn tags_are_unique_and_increasing() {
        let src = TagSource::default();
        let a = src.next();
        let b = src.next();
        assert!(b > a);
    }

    #[test]
    fn concurrent_requests_get_their_own_replies() {
        let (tx, rx) = mpsc::sync_channel::<Intertask<u32, u32>>(4);
        let server = thread::spawn(move || {
            let mut held = Vec::new();
            while let Ok(req) = rx.recv() {
                held.push(req);
                if held.len() == 2 {
                    // Answer in reverse order.
                    while let Some(req) = held.pop() {
                        let v = req.payload * 10;
                        req.respond(v);
                    }
                }
            }
        });
        let src = std::sync::Arc::new(TagSource::default());
        let clients: Vec<_> = (1..=2u32)
            .map(|n| {
                let tx = tx.clone();
                let src = src.clone();
                thread::spawn(move || request(&tx, src.next(), n, "test").unwrap())
            })
            .collect();
        let mut results: Vec<u32> = clients.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort_unstable();
        assert_eq!(results, vec![10, 20]);
        drop(tx);
        server.join().unwrap();
    }

    #[test]
    fn dead_server_is_disconnected() {
        let (tx, rx) = mpsc::sync_channel::<Intertask<u8, u8>>(1);
        drop(rx);
        let err = request(&tx, Tag(1), 0, "gone").unwrap_err();
        assert_eq!(err.kind(), fwin_core::error::ErrorKind::Disconnected);
    }

    #[test]
    fn dropped_request_is_disconnected() {
        let (tx, rx) = mpsc::sync_channel::<Intertask<u8, u8>>(1);
        let server = thread::spawn(move || {
            let req = rx.recv().unwrap();
            drop(req);
        });
        let err = request(&tx, Tag(1), 0, "drop").unwrap_err();
        assert_eq!(err.kind(), fwin_core::error::ErrorKind::Disconnected);
        server.join().unwrap();
    }
}
