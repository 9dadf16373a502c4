//! Remote control over OSC.
//!
//! A single message is understood:
//!
//! ```text
//! /switch <int|float> [<int|float> ...]
//! ```
//!
//! Each numeric argument is a 1-based choice number and flips that choice.
//! Floats are truncated toward zero. Arguments of other types, numbers out of
//! range and messages to other addresses are skipped; bundles are walked
//! recursively. Socket handling stays with the caller: feed received
//! datagrams to [`handle_packet`].

use rosc::{OscPacket, OscType};

use crate::control::ControlPlane;

/// Address of the switch message.
pub const SWITCH_ADDRESS: &str = "/switch";

/// Collect the raw choice numbers carried by every `/switch` message in
/// `packet`, in order.
pub fn switch_targets(packet: &OscPacket) -> Vec<i32> {
    let mut targets = Vec::new();
    collect_targets(packet, &mut targets);
    targets
}

fn collect_targets(packet: &OscPacket, out: &mut Vec<i32>) {
    match packet {
        OscPacket::Message(msg) => {
            if msg.addr != SWITCH_ADDRESS {
                return;
            }
            for arg in &msg.args {
                match arg {
                    OscType::Int(i) => out.push(*i),
                    OscType::Float(f) => out.push(*f as i32),
                    other => tracing::debug!(?other, "ignoring non-numeric /switch argument"),
                }
            }
        }
        OscPacket::Bundle(bundle) => {
            for inner in &bundle.content {
                collect_targets(inner, out);
            }
        }
    }
}

/// Decode one UDP datagram and apply every `/switch` argument it carries.
///
/// Returns how many choices were flipped. Malformed datagrams are logged and
/// ignored.
pub fn handle_packet(control: &ControlPlane<'_>, datagram: &[u8]) -> usize {
    let packet = match rosc::decoder::decode_udp(datagram) {
        Ok((_, packet)) => packet,
        Err(err) => {
            tracing::debug!(?err, "dropping malformed OSC datagram");
            return 0;
        }
    };

    switch_targets(&packet)
        .into_iter()
        .filter(|&target| control.remote_switch(target))
        .count()
}
