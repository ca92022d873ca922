#![no_main]

use arbitrary::Arbitrary;
use jsonpool::{Node, NodeId, OutBuf, Pool, PoolError, Progress};
use libfuzzer_sys::fuzz_target;

const POOL_NODES: usize = 256;

#[derive(Arbitrary, Debug)]
enum Doc {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Doc>),
    Object(Vec<(String, Doc)>),
}

#[derive(Arbitrary, Debug)]
struct Input {
    doc: Doc,
    window: u8,
}

/// Keep only bytes that need no escaping inside a JSON string.
fn plain(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

fn build<'a>(
    doc: &Doc,
    pool: &mut Pool<'a, '_>,
    strings: &'a [String],
    next: &mut usize,
) -> Result<NodeId, PoolError> {
    match doc {
        Doc::Null => pool.null(),
        Doc::Bool(b) => pool.boolean(*b),
        Doc::Integer(n) => pool.integer(*n),
        Doc::Float(f) => pool.float(*f),
        Doc::String(_) => {
            let id = pool.string(strings[*next].as_str());
            *next += 1;
            id
        }
        Doc::Array(items) => {
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                children.push(build(item, pool, strings, next)?);
            }
            pool.array(&children)
        }
        Doc::Object(members) => {
            let mut children = Vec::with_capacity(members.len());
            for (_, value) in members {
                let key = strings[*next].as_str();
                *next += 1;
                let id = build(value, pool, strings, next)?;
                children.push(pool.keyed(key, id));
            }
            pool.object(&children)
        }
    }
}

/// Strings in the order `build` consumes them.
fn collect_strings(doc: &Doc, strings: &mut Vec<String>) {
    match doc {
        Doc::String(s) => strings.push(plain(s)),
        Doc::Array(items) => items.iter().for_each(|item| collect_strings(item, strings)),
        Doc::Object(members) => {
            for (i, (key, value)) in members.iter().enumerate() {
                strings.push(format!("{}_{i}", plain(key)));
                collect_strings(value, strings);
            }
        }
        _ => {}
    }
}

fuzz_target!(|input: Input| {
    let mut strings = Vec::new();
    collect_strings(&input.doc, &mut strings);

    let mut storage = vec![Node::EMPTY; POOL_NODES];
    let mut pool = Pool::new(&mut storage);
    let Ok(root) = build(&input.doc, &mut pool, &strings, &mut 0) else {
        // too large for the pool
        return;
    };

    let mut whole = Vec::new();
    let progress = pool.emit(root, &mut |b: u8| whole.push(b), &mut OutBuf::unbounded());
    assert_eq!(progress, Progress::Complete);
    assert_eq!(whole.pop(), Some(0));
    serde_json::from_slice::<serde_json::Value>(&whole).expect("emitted text is JSON");

    pool.rewind(root);
    let mut buf = vec![0u8; 1 + usize::from(input.window % 32)];
    let mut out = OutBuf::new(&mut buf);
    let mut pieces = Vec::new();
    let mut cursor = root;
    loop {
        let progress = pool.emit(cursor, &mut |_: u8| (), &mut out);
        pieces.extend_from_slice(out.as_bytes());
        out.clear();
        match progress {
            Progress::Complete => break,
            Progress::Suspended(at) => cursor = at,
        }
    }
    assert_eq!(pieces, whole);
});
