// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Client side of the Arm System Control and Management Interface.
//!
//! Every message is a 32-bit header followed by a fixed little-endian payload. Every response
//! starts with the same header and a signed 32-bit status. The physical transport (shared memory
//! and doorbell) lives behind [`ScmiChannel`], this module only builds and checks the bytes.

pub mod imx9;
pub mod system_power;

use arm_psci::ErrorCode;
use arrayvec::ArrayVec;
use core::fmt::{self, Display, Formatter};
use log::error;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    byteorder::little_endian::{I32, U32},
};

/// Size in bytes of the largest message, including the header.
pub const MAX_MESSAGE_SIZE: usize = 128;

/// Size of the message header.
pub const HEADER_SIZE: usize = size_of::<u32>();

/// Size of the header and status at the start of every response.
pub const RESPONSE_HEADER_SIZE: usize = size_of::<ResponseHeader>();

const MESSAGE_ID_MASK: u32 = 0xff;
const MESSAGE_TYPE_COMMAND: u32 = 0;
const MESSAGE_TYPE_SHIFT: u32 = 8;
const PROTOCOL_ID_SHIFT: u32 = 10;
const TOKEN_SHIFT: u32 = 18;
const TOKEN_MASK: u16 = 0x3ff;

/// A synchronous request/response transport to the SCMI platform.
pub trait ScmiChannel {
    /// Sends `request` and blocks until the platform has replied.
    ///
    /// The response is copied into the start of `response` and its length returned. Timeouts and
    /// any other transport problems are reported as [`ScmiError::Transport`].
    fn exchange(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, ScmiError>;
}

/// Non-success status codes defined by SCMI.
#[derive(Clone, Copy, Debug, Eq, IntoPrimitive, PartialEq, TryFromPrimitive)]
#[repr(i32)]
pub enum ScmiStatus {
    /// The command succeeded.
    Success = 0,
    /// The command or an argument isn't supported.
    NotSupported = -1,
    /// An argument was invalid.
    InvalidParameters = -2,
    /// The agent isn't allowed to make the request.
    Denied = -3,
    /// The requested entity doesn't exist.
    NotFound = -4,
    /// A value was out of range.
    OutOfRange = -5,
    /// The platform can't handle the request right now.
    Busy = -6,
    /// The message couldn't be delivered.
    CommsError = -7,
    /// The platform failed for some other reason.
    GenericError = -8,
    /// The hardware failed.
    HardwareError = -9,
    /// The message broke the protocol.
    ProtocolError = -10,
}

/// An SCMI transaction failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScmiError {
    /// The platform replied with a status other than success.
    Status(ScmiStatus),
    /// The platform replied with a status which SCMI doesn't define.
    UnknownStatus(i32),
    /// The response was shorter than the message requires.
    ShortResponse {
        /// Number of bytes the message requires.
        expected: usize,
        /// Number of bytes actually received.
        actual: usize,
    },
    /// The request doesn't fit in a single message.
    PayloadTooLarge,
    /// The channel failed to deliver the request or the response.
    Transport,
}

impl Display for ScmiError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "platform returned {status:?}"),
            Self::UnknownStatus(status) => write!(f, "platform returned unknown status {status}"),
            Self::ShortResponse { expected, actual } => {
                write!(f, "response of {actual} bytes, expected {expected}")
            }
            Self::PayloadTooLarge => write!(f, "request payload too large"),
            Self::Transport => write!(f, "transport error"),
        }
    }
}

impl From<ScmiError> for ErrorCode {
    fn from(_: ScmiError) -> Self {
        ErrorCode::InternalFailure
    }
}

/// SCMI protocols used by the power management code.
#[derive(Clone, Copy, Debug, Eq, IntoPrimitive, PartialEq)]
#[repr(u8)]
pub enum ProtocolId {
    /// SCMI system power management.
    SystemPower = 0x12,
    /// SCMI performance domain management.
    Performance = 0x13,
    /// NXP vendor protocol for controlling the application cores.
    Imx9Cpu = 0x82,
}

/// Builds the header of a command message.
pub const fn message_header(protocol: ProtocolId, message_id: u8, token: u16) -> u32 {
    (message_id as u32 & MESSAGE_ID_MASK)
        | (MESSAGE_TYPE_COMMAND << MESSAGE_TYPE_SHIFT)
        | ((protocol as u32) << PROTOCOL_ID_SHIFT)
        | (((token & TOKEN_MASK) as u32) << TOKEN_SHIFT)
}

/// The header and status which start every response.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct ResponseHeader {
    /// The header of the command being answered.
    pub header: U32,
    /// An [`ScmiStatus`].
    pub status: I32,
}

impl ResponseHeader {
    /// Maps the status field to a result.
    pub fn check_status(&self) -> Result<(), ScmiError> {
        match ScmiStatus::try_from(self.status.get()) {
            Ok(ScmiStatus::Success) => Ok(()),
            Ok(status) => Err(ScmiError::Status(status)),
            Err(_) => Err(ScmiError::UnknownStatus(self.status.get())),
        }
    }
}

/// An SCMI command with a fixed layout.
///
/// The implementing type is the request payload, excluding the header.
pub trait Message: Immutable + IntoBytes + Sized {
    /// The protocol the message belongs to.
    const PROTOCOL: ProtocolId;
    /// The message id within the protocol.
    const MESSAGE_ID: u8;

    /// The response payload, excluding the header and status.
    type Response: FromBytes;

    /// Length of the request on the wire.
    const REQUEST_LENGTH: usize = HEADER_SIZE + size_of::<Self>();
    /// Length of a successful response on the wire.
    const RESPONSE_LENGTH: usize = RESPONSE_HEADER_SIZE + size_of::<Self::Response>();
}

/// Sends SCMI commands over a channel.
pub struct Scmi<C> {
    channel: C,
    token: u16,
}

impl<C: ScmiChannel> Scmi<C> {
    /// Creates a new client using the given channel.
    pub const fn new(channel: C) -> Self {
        Self { channel, token: 0 }
    }

    /// Returns a reference to the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Sends a fixed layout command and returns its response payload.
    pub fn send<M: Message>(&mut self, request: &M) -> Result<M::Response, ScmiError> {
        let mut response = [0; MAX_MESSAGE_SIZE];
        let response = response
            .get_mut(..M::RESPONSE_LENGTH)
            .ok_or(ScmiError::PayloadTooLarge)?;
        self.transact(M::PROTOCOL, M::MESSAGE_ID, &[request.as_bytes()], response)?;
        let (payload, _) = M::Response::read_from_prefix(&response[RESPONSE_HEADER_SIZE..])
            .map_err(|_| ScmiError::ShortResponse {
                expected: M::RESPONSE_LENGTH,
                actual: response.len(),
            })?;
        Ok(payload)
    }

    /// Sends a command built from the concatenation of `payload` and waits for a response of
    /// exactly `response.len()` bytes, including its header.
    pub fn transact(
        &mut self,
        protocol: ProtocolId,
        message_id: u8,
        payload: &[&[u8]],
        response: &mut [u8],
    ) -> Result<(), ScmiError> {
        let mut request = ArrayVec::<u8, MAX_MESSAGE_SIZE>::new();
        let header = message_header(protocol, message_id, self.next_token());
        request
            .try_extend_from_slice(&header.to_le_bytes())
            .map_err(|_| ScmiError::PayloadTooLarge)?;
        for part in payload {
            request
                .try_extend_from_slice(part)
                .map_err(|_| ScmiError::PayloadTooLarge)?;
        }

        let expected = response.len();
        let actual = self.channel.exchange(&request, response).inspect_err(|e| {
            error!("SCMI protocol {protocol:?} message {message_id:#x}: {e}");
        })?;
        let (status, _) = ResponseHeader::read_from_prefix(&response[..actual.min(expected)])
            .map_err(|_| ScmiError::ShortResponse { expected, actual })?;
        status.check_status().inspect_err(|e| {
            error!("SCMI protocol {protocol:?} message {message_id:#x}: {e}");
        })?;
        if actual < expected {
            return Err(ScmiError::ShortResponse { expected, actual });
        }
        Ok(())
    }

    fn next_token(&mut self) -> u16 {
        let token = self.token;
        self.token = (self.token + 1) & TOKEN_MASK;
        token
    }
}
