use std::sync::mpsc::{self, Receiver, TryRecvError};

use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{debug, info};

use super::{MidiPort, TransportError};

const CLIENT_NAME: &str = "vflexctl";

/// A system MIDI port opened through `midir`.
///
/// The device shows up as one input and one output port with the same name;
/// both are opened by exact name match. Inbound messages are queued by the
/// midir callback thread and handed out by [`MidiPort::poll`].
pub struct MidirPort {
    name: String,
    output: MidiOutputConnection,
    inbox: Receiver<Vec<u8>>,
    _input: MidiInputConnection<()>,
}

impl MidirPort {
    pub fn open(name: &str) -> Result<Self, TransportError> {
        let mut input =
            MidiInput::new(CLIENT_NAME).map_err(|err| TransportError::Port(err.to_string()))?;
        input.ignore(Ignore::None);
        let output =
            MidiOutput::new(CLIENT_NAME).map_err(|err| TransportError::Port(err.to_string()))?;

        let in_port = input
            .ports()
            .into_iter()
            .find(|port| input.port_name(port).is_ok_and(|n| n == name))
            .ok_or_else(|| TransportError::PortNotFound {
                name: name.to_string(),
            })?;
        let out_port = output
            .ports()
            .into_iter()
            .find(|port| output.port_name(port).is_ok_and(|n| n == name))
            .ok_or_else(|| TransportError::PortNotFound {
                name: name.to_string(),
            })?;

        let (tx, inbox) = mpsc::channel();
        let input_conn = input
            .connect(
                &in_port,
                "vflexctl-in",
                move |_stamp, message, _| {
                    // The receiver only goes away when the port is dropped.
                    let _ = tx.send(message.to_vec());
                },
                (),
            )
            .map_err(|err| TransportError::Port(err.to_string()))?;
        let output_conn = output
            .connect(&out_port, "vflexctl-out")
            .map_err(|err| TransportError::Port(err.to_string()))?;

        info!(port = name, "opened MIDI port");
        Ok(Self {
            name: name.to_string(),
            output: output_conn,
            inbox,
            _input: input_conn,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl MidiPort for MidirPort {
    fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        self.output
            .send(message)
            .map_err(|err| TransportError::Port(err.to_string()))
    }

    fn poll(&mut self) -> Result<Vec<Vec<u8>>, TransportError> {
        let mut messages = Vec::new();
        loop {
            match self.inbox.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(TransportError::Closed),
            }
        }
        if !messages.is_empty() {
            debug!(port = %self.name, messages = messages.len(), "received MIDI messages");
        }
        Ok(messages)
    }
}
