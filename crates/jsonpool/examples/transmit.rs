//! Sends a sensor report through a 16-byte transmit buffer.
//!
//! The report holds a streaming array of readings: the pool only ever keeps
//! one reading node alive, and the regenerator rewrites it once it has been
//! sent.

use jsonpool::{Node, NodeId, OutBuf, Pool, PoolError, Progress, Value};

const READINGS: i64 = 12;

/// Replace the single reading with the next one.
#[allow(clippy::cast_possible_truncation)]
fn next_reading(pool: &mut Pool<'_, '_>, readings: NodeId) -> Option<usize> {
    let reading = pool.children(readings).next()?;
    let Value::Float(previous) = pool.value(reading) else {
        return None;
    };
    let sample = previous + 0.5;
    pool.set_float(reading, sample).ok()?;
    let sent = (sample * 2.0) as i64 - 40;
    usize::try_from(READINGS - sent).ok()
}

fn build_report(pool: &mut Pool<'static, '_>) -> Result<NodeId, PoolError> {
    let device = pool.string("probe-7")?;
    let device = pool.keyed("device", device);
    let first = pool.float(20.5)?;
    let readings = pool.streaming_array(next_reading, &[first])?;
    let readings = pool.keyed("celsius", readings);
    let ok = pool.true_()?;
    let ok = pool.keyed("ok", ok);
    pool.object(&[device, readings, ok])
}

fn main() -> Result<(), PoolError> {
    let mut storage = [Node::EMPTY; 5];
    let mut pool = Pool::new(&mut storage);
    let report = build_report(&mut pool)?;
    println!("nodes in use: {} of {}", pool.in_use(), pool.capacity());

    let mut buffer = [0u8; 16];
    let mut out = OutBuf::new(&mut buffer);
    let mut cursor = report;
    let mut packets = 0;
    loop {
        let progress = pool.emit(cursor, &mut |_: u8| (), &mut out);
        packets += 1;
        println!("packet {packets:>2}: {}", String::from_utf8_lossy(out.as_bytes()));
        out.clear();
        match progress {
            Progress::Complete => break,
            Progress::Suspended(at) => cursor = at,
        }
    }
    Ok(())
}
