//! Binary persisted form of a DFA.
//!
//! Layout, all integers 8-byte big-endian:
//!
//! ```text
//! dfa        := order:i64 start:str states
//! states     := -1:i64                          (absent)
//!             | count:i64 (name:str record:bytes)*
//! record     := ordering:i64 name:str value:bytes table accepting:u8
//! table      := count:i64 (symbol:str symbol:str destination:str)*
//! str, bytes := len:u64 byte*
//! ```
//!
//! States are written sorted by name and table entries sorted by symbol, so
//! equal automata encode to equal bytes. An empty state collection is
//! written as absent; both forms decode to an empty collection.

use crate::automaton::arena::StateArena;
use crate::automaton::dfa::DFA;
use crate::automaton::error::{AutomatonError, Result};
use crate::automaton::state::DfaState;
use crate::automaton::transition::Transition;
use bytes::{Buf, BufMut, BytesMut};
use std::collections::HashMap;

const ABSENT: i64 = -1;

/// Caller-supplied serialization for state payloads.
pub trait PayloadCodec<E> {
    fn encode(&self, value: &E) -> Vec<u8>;
    fn decode(&self, bytes: &[u8]) -> std::result::Result<E, String>;
}

/// A [`PayloadCodec`] built from a pair of closures.
#[derive(Debug, Clone, Copy)]
pub struct FnCodec<Enc, Dec> {
    encode: Enc,
    decode: Dec,
}

impl<Enc, Dec> FnCodec<Enc, Dec> {
    pub fn new(encode: Enc, decode: Dec) -> Self {
        Self { encode, decode }
    }
}

impl<E, Enc, Dec> PayloadCodec<E> for FnCodec<Enc, Dec>
where
    Enc: Fn(&E) -> Vec<u8>,
    Dec: Fn(&[u8]) -> std::result::Result<E, String>,
{
    fn encode(&self, value: &E) -> Vec<u8> {
        (self.encode)(value)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<E, String> {
        (self.decode)(bytes)
    }
}

/// UTF-8 payloads stored verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl PayloadCodec<String> for StringCodec {
    fn encode(&self, value: &String) -> Vec<u8> {
        value.as_bytes().to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<String, String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
    }
}

impl<E> DFA<E> {
    /// Serialize this DFA, delegating payloads to `codec`.
    ///
    /// A DFA with no states writes the absent marker in place of a count.
    pub fn encode(&self, codec: &impl PayloadCodec<E>) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_i64(self.order as i64);
        put_str(&mut buf, &self.start);

        if self.states.is_empty() {
            buf.put_i64(ABSENT);
        } else {
            buf.put_i64(self.states.len() as i64);
            for name in self.states.names() {
                let Some(state) = self.states.get(&name) else {
                    continue;
                };
                put_str(&mut buf, &name);
                put_bytes(&mut buf, &encode_state(state, codec));
            }
        }

        buf.to_vec()
    }

    /// Deserialize a DFA written by [`DFA::encode`].
    ///
    /// An absent state collection and a zero count both decode to a DFA with
    /// no states; the in-memory form has no separate "absent" state, so the
    /// two are not told apart after decoding.
    pub fn decode(bytes: &[u8], codec: &impl PayloadCodec<E>) -> Result<Self> {
        let mut reader = Reader { buf: bytes };
        let order = reader.u64(".order")?;
        let start = reader.string(".start")?;

        let mut states = StateArena::default();
        let count = reader.i64(".states")?;
        if count != ABSENT {
            if count < 0 {
                return Err(AutomatonError::decode(".states", format!("invalid count {count}")));
            }
            for _ in 0..count {
                let name = reader.string(".states")?;
                let field = format!(".states[{name}]");
                let record = reader.bytes(&field)?;
                let state = decode_state(record, codec).map_err(|e| e.within(&field))?;
                if state.name != name {
                    return Err(AutomatonError::decode(
                        format!("{field}.name"),
                        format!("record is named {:?}", state.name),
                    ));
                }
                if states.contains(&name) {
                    return Err(AutomatonError::decode(field, "duplicate state"));
                }
                states.insert(state);
            }
        }

        if !reader.buf.is_empty() {
            return Err(AutomatonError::decode(
                ".",
                format!("{} unexpected trailing bytes", reader.buf.len()),
            ));
        }

        Ok(DFA {
            start,
            order,
            states,
        })
    }
}

fn encode_state<E>(state: &DfaState<E>, codec: &impl PayloadCodec<E>) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_i64(state.ordering as i64);
    put_str(&mut buf, &state.name);
    put_bytes(&mut buf, &codec.encode(&state.value));

    buf.put_i64(state.transitions.len() as i64);
    for t in state.transitions() {
        put_str(&mut buf, &t.symbol);
        put_str(&mut buf, &t.symbol);
        put_str(&mut buf, &t.destination);
    }

    buf.put_u8(u8::from(state.accepting));
    buf.to_vec()
}

fn decode_state<E>(record: &[u8], codec: &impl PayloadCodec<E>) -> Result<DfaState<E>> {
    let mut reader = Reader { buf: record };
    let ordering = reader.u64(".ordering")?;
    let name = reader.string(".name")?;
    let value = codec
        .decode(reader.bytes(".value")?)
        .map_err(|message| AutomatonError::decode(".value", message))?;

    let count = reader.i64(".transitions")?;
    if count < 0 {
        return Err(AutomatonError::decode(".transitions", format!("invalid count {count}")));
    }
    let mut transitions = HashMap::new();
    for _ in 0..count {
        let symbol = reader.string(".transitions")?;
        let field = format!(".transitions[{symbol}]");
        let transition = Transition {
            symbol: reader.string(&format!("{field}.symbol"))?,
            destination: reader.string(&format!("{field}.destination"))?,
        };
        if transition.symbol != symbol {
            return Err(AutomatonError::decode(
                format!("{field}.symbol"),
                format!("entry carries symbol {:?}", transition.symbol),
            ));
        }
        transitions.insert(symbol, transition);
    }

    let accepting = match reader.u8(".accepting")? {
        0 => false,
        1 => true,
        other => {
            return Err(AutomatonError::decode(".accepting", format!("invalid flag {other}")));
        }
    };

    if !reader.buf.is_empty() {
        return Err(AutomatonError::decode(
            "",
            format!("{} unexpected trailing bytes", reader.buf.len()),
        ));
    }

    Ok(DfaState {
        name,
        ordering,
        value,
        accepting,
        transitions,
    })
}

fn put_bytes(buf: &mut BytesMut, bytes: &[u8]) {
    buf.put_u64(bytes.len() as u64);
    buf.put_slice(bytes);
}

fn put_str(buf: &mut BytesMut, s: &str) {
    put_bytes(buf, s.as_bytes());
}

/// Bounds-checked reads that name the field being read on failure.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn need(&self, n: usize, field: &str) -> Result<()> {
        if self.buf.remaining() < n {
            Err(AutomatonError::decode(field, "not enough bytes"))
        } else {
            Ok(())
        }
    }

    fn u8(&mut self, field: &str) -> Result<u8> {
        self.need(1, field)?;
        Ok(self.buf.get_u8())
    }

    fn i64(&mut self, field: &str) -> Result<i64> {
        self.need(8, field)?;
        Ok(self.buf.get_i64())
    }

    fn u64(&mut self, field: &str) -> Result<u64> {
        let v = self.i64(field)?;
        u64::try_from(v).map_err(|_| AutomatonError::decode(field, format!("negative value {v}")))
    }

    fn bytes(&mut self, field: &str) -> Result<&'a [u8]> {
        let len = self.u64(field)?;
        let len = usize::try_from(len)
            .map_err(|_| AutomatonError::decode(field, "length out of range"))?;
        self.need(len, field)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    fn string(&mut self, field: &str) -> Result<String> {
        let bytes = self.bytes(field)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| AutomatonError::decode(field, format!("invalid UTF-8: {e}")))
    }
}
