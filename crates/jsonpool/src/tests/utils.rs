use std::vec::Vec;

use crate::{NodeId, OutBuf, Pool, Progress};

/// Bytes seen by the sink and by the window over a whole pass.
#[derive(Debug, Default)]
pub(crate) struct Transcript {
    pub sink: Vec<u8>,
    pub window: Vec<u8>,
    pub calls: usize,
}

/// Emit `root` in one unbounded call; returns what the sink received.
pub(crate) fn render(pool: &mut Pool<'_, '_>, root: NodeId) -> Vec<u8> {
    let mut bytes = Vec::new();
    let progress = pool.emit(root, &mut |b: u8| bytes.push(b), &mut OutBuf::unbounded());
    assert_eq!(progress, Progress::Complete);
    bytes
}

/// Emit `root` through a `window`-byte buffer, resuming until complete.
pub(crate) fn render_windowed(pool: &mut Pool<'_, '_>, root: NodeId, window: usize) -> Transcript {
    let mut buf = std::vec![0u8; window];
    let mut out = OutBuf::new(&mut buf);
    let mut transcript = Transcript::default();
    let mut cursor = root;
    loop {
        transcript.calls += 1;
        let progress = pool.emit(cursor, &mut |b: u8| transcript.sink.push(b), &mut out);
        assert!(out.len() <= window);
        transcript.window.extend_from_slice(out.as_bytes());
        out.clear();
        match progress {
            Progress::Complete => return transcript,
            Progress::Suspended(at) => cursor = at,
        }
    }
}

/// The sink output with its trailing `\0` terminator removed.
pub(crate) fn text(mut bytes: Vec<u8>) -> Vec<u8> {
    assert_eq!(bytes.pop(), Some(0), "missing terminator");
    bytes
}
