#![allow(dead_code)]

use jsonpool::{NodeId, OutBuf, Pool, PoolError, Progress};

/// `{"colors":{"yellow":[255,255,0],"cyan":[0,255,255],"magenta":[255,0,255]}}`
/// built the incremental way: empty containers first, then appends.
pub fn colors(pool: &mut Pool<'static, '_>) -> Result<NodeId, PoolError> {
    let palette = pool.object(&[])?;
    for (name, rgb) in [
        ("yellow", [255, 255, 0]),
        ("cyan", [0, 255, 255]),
        ("magenta", [255, 0, 255]),
    ] {
        let channels = pool.array(&[])?;
        for channel in rgb {
            let channel = pool.integer(channel)?;
            pool.array_append(channels, channel)?;
        }
        pool.object_add(palette, name, channels)?;
    }
    let root = pool.object(&[])?;
    pool.object_add(root, "colors", palette)
}

/// Nodes `colors` allocates.
pub const COLORS_NODES: usize = 14;

/// Run `root` through a `window`-byte buffer and return one entry per call.
pub fn transmit(pool: &mut Pool<'_, '_>, root: NodeId, window: usize) -> Vec<String> {
    let mut buf = vec![0u8; window];
    let mut out = OutBuf::new(&mut buf);
    let mut calls = Vec::new();
    let mut cursor = root;
    loop {
        let progress = pool.emit(cursor, &mut |_: u8| (), &mut out);
        calls.push(String::from_utf8_lossy(out.as_bytes()).into_owned());
        out.clear();
        match progress {
            Progress::Complete => return calls,
            Progress::Suspended(at) => cursor = at,
        }
    }
}

/// Emit in one go and return the sink bytes, terminator included.
pub fn sink_bytes(pool: &mut Pool<'_, '_>, root: NodeId) -> Vec<u8> {
    let mut bytes = Vec::new();
    let progress = pool.emit(root, &mut |b: u8| bytes.push(b), &mut OutBuf::unbounded());
    assert!(progress.is_complete());
    bytes
}
