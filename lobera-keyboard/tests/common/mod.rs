//! In-memory keyboard for integration tests
//!
//! Answers every vendor request the way the firmware stores its tables
//! and logs each request with its start time on a virtual clock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use lobera_keyboard::KeyboardInterface;
use lobera_transport::protocol::{req, size};
use lobera_transport::{ControlChannel, ManualClock, PacedTransport, TransportError};

/// Virtual duration of one control transfer
pub const TRANSFER_TIME: Duration = Duration::from_millis(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Out,
    In,
}

/// One request as seen by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub at: Duration,
    pub done: Duration,
    pub dir: Dir,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub len: usize,
}

pub struct SimulatedKeyboard {
    clock: Rc<ManualClock>,
    pub log: Vec<Request>,
    pub profile: u8,
    pub status: [u8; size::STATUS],
    pub colors: [u8; size::COLORS],
    pub finalized: usize,
    pub thumb_blocks: HashMap<u16, Vec<u8>>,
    pub thumb_enabled: HashMap<(u16, u8), bool>,
    pub offsets: HashMap<u16, Vec<u8>>,
    pub data: HashMap<u16, Vec<u8>>,
    pub repeats: HashMap<u16, Vec<u8>>,
    /// Truncate every reply of this request to this length
    pub short_reply: Option<(u8, usize)>,
    /// Fail every request with this code
    pub fail_request: Option<u8>,
}

impl SimulatedKeyboard {
    pub fn new(clock: Rc<ManualClock>) -> Self {
        Self {
            clock,
            log: Vec::new(),
            profile: 1,
            status: [0; size::STATUS],
            colors: [0; size::COLORS],
            finalized: 0,
            thumb_blocks: HashMap::new(),
            thumb_enabled: HashMap::new(),
            offsets: HashMap::new(),
            data: HashMap::new(),
            repeats: HashMap::new(),
            short_reply: None,
            fail_request: None,
        }
    }

    /// Requests with the given code and direction
    pub fn requests(&self, dir: Dir, request: u8) -> Vec<&Request> {
        self.log
            .iter()
            .filter(|r| r.dir == dir && r.request == request)
            .collect()
    }

    pub fn writes(&self) -> Vec<&Request> {
        self.log.iter().filter(|r| r.dir == Dir::Out).collect()
    }

    fn record(&mut self, dir: Dir, request: u8, value: u16, index: u16, len: usize) {
        let at = self.clock.elapsed();
        self.clock.advance(TRANSFER_TIME);
        self.log.push(Request {
            at,
            done: self.clock.elapsed(),
            dir,
            request,
            value,
            index,
            len,
        });
    }
}

impl ControlChannel for SimulatedKeyboard {
    fn send(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        self.record(Dir::Out, request, value, index, payload.len());
        if self.fail_request == Some(request) {
            return Err(TransportError::Timeout);
        }

        match request {
            req::SET_PROFILE if value == 0 => self.finalized += 1,
            req::SET_PROFILE => self.profile = value as u8,
            req::SET_LIGHT_MODE => self.status[4] = value as u8,
            req::SET_COLORS => self.colors.copy_from_slice(payload),
            req::SET_THUMB_MACROS => {
                self.thumb_blocks.insert(index, payload.to_vec());
            }
            req::SET_THUMB_ENABLED => {
                self.thumb_enabled
                    .insert((index, value as u8), value >> 8 != 0);
            }
            req::SET_KEY_OFFSETS => {
                self.offsets.insert(index, payload.to_vec());
            }
            req::SET_KEY_DATA => {
                self.data.insert(index, payload.to_vec());
            }
            req::SET_KEY_REPEATS => {
                self.repeats.insert(index, payload.to_vec());
            }
            _ => return Err(TransportError::Usb(format!("unexpected write 0x{request:02X}"))),
        }
        Ok(payload.len())
    }

    fn receive(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        self.record(Dir::In, request, value, index, size);
        if self.fail_request == Some(request) {
            return Err(TransportError::Timeout);
        }

        let stored = |map: &HashMap<u16, Vec<u8>>, len: usize| {
            map.get(&index).cloned().unwrap_or_else(|| vec![0u8; len])
        };
        let mut reply = match request {
            req::GET_PROFILE => vec![self.profile],
            req::GET_STATUS => self.status.to_vec(),
            req::GET_COLORS => self.colors.to_vec(),
            req::GET_THUMB_ENABLED => {
                let on = self
                    .thumb_enabled
                    .get(&(index, value as u8))
                    .copied()
                    .unwrap_or(false);
                vec![u8::from(on)]
            }
            req::GET_THUMB_MACROS => stored(&self.thumb_blocks, size::THUMB_BLOCK),
            req::GET_KEY_OFFSETS => stored(&self.offsets, size::OFFSET_TABLE),
            req::GET_KEY_DATA => stored(&self.data, size::BATCH),
            req::GET_KEY_REPEATS => stored(&self.repeats, size::REPEAT_TABLE),
            _ => return Err(TransportError::Usb(format!("unexpected read 0x{request:02X}"))),
        };
        reply.truncate(size);
        if let Some((code, len)) = self.short_reply {
            if code == request {
                reply.truncate(len);
            }
        }
        Ok(reply)
    }
}

pub type TestKeyboard = KeyboardInterface<SimulatedKeyboard, Rc<ManualClock>>;

/// A keyboard interface over a fresh simulated device on virtual time
pub fn keyboard() -> (TestKeyboard, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let device = SimulatedKeyboard::new(Rc::clone(&clock));
    let transport = PacedTransport::with_clock(device, Rc::clone(&clock));
    (KeyboardInterface::with_transport(transport), clock)
}

pub fn device(kb: &TestKeyboard) -> &SimulatedKeyboard {
    kb.transport().inner()
}

pub fn device_mut(kb: &mut TestKeyboard) -> &mut SimulatedKeyboard {
    kb.transport_mut().inner_mut()
}
