use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKey {
    Application,
    Transport,
    Internet,
    Link,
}

impl LayerKey {
    /// Top of the stack first, the order data is encapsulated in.
    pub const ALL: [LayerKey; 4] = [
        LayerKey::Application,
        LayerKey::Transport,
        LayerKey::Internet,
        LayerKey::Link,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::Transport => "Transport",
            Self::Internet => "Internet",
            Self::Link => "Link",
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layer '{0}' (expected app, transport, internet or link)")]
pub struct UnknownLayer(pub String);

impl FromStr for LayerKey {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "app" | "application" => Ok(Self::Application),
            "trans" | "transport" => Ok(Self::Transport),
            "inet" | "internet" => Ok(Self::Internet),
            "link" => Ok(Self::Link),
            _ => Err(UnknownLayer(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Protocol {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
}

const fn proto(name: &'static str) -> Protocol {
    Protocol { name, title: None }
}

const fn titled(name: &'static str, title: &'static str) -> Protocol {
    Protocol {
        name,
        title: Some(title),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    pub key: LayerKey,
    pub name: &'static str,
    pub number: &'static str,
    pub badge: &'static str,
    pub summary: &'static str,
    pub detail: &'static str,
    pub protocols: &'static [Protocol],
    pub pdu: &'static str,
}

pub static LAYERS: [Layer; 4] = [
    Layer {
        key: LayerKey::Application,
        name: "Application Layer",
        number: "Layer 4",
        badge: "USER-FACING",
        summary: "The Application Layer is where user-facing protocols live. When you open a \
                  browser and type a URL, your browser uses HTTP (or HTTPS) to request a \
                  webpage. This layer deals with what data is exchanged and its meaning, not \
                  how it travels.",
        detail: "It abstracts all lower-level complexity. Applications don't care whether data \
                 travels over Wi-Fi or fiber; they just make requests and receive responses.",
        protocols: &[
            titled("HTTP", "Hypertext Transfer Protocol | on port 80"),
            titled("HTTPS", "Hypertext Transfer Protocol Secure | on port 443"),
            titled("DNS", "Domain Name System | on port 53"),
            titled("FTP", "File Transfer Protocol | on port 21"),
            titled("SMTP", "Simple Mail Transfer Protocol | on port 25"),
            titled("SSH", "Secure Shell | on port 22"),
            titled("DHCP", "Dynamic Host Configuration Protocol | on port 67"),
        ],
        pdu: "Message / Data",
    },
    Layer {
        key: LayerKey::Transport,
        name: "Transport Layer",
        number: "Layer 3",
        badge: "END-TO-END",
        summary: "The Transport Layer is responsible for end-to-end communication between \
                  applications. It takes the message from the Application layer and splits it \
                  into segments. Each segment gets a source and destination port number.",
        detail: "TCP (Transmission Control Protocol) provides reliable, ordered delivery with \
                 error correction. UDP (User Datagram Protocol) is faster but unreliable, \
                 perfect for streaming or games.",
        protocols: &[proto("TCP"), proto("UDP"), proto("TLS"), proto("QUIC")],
        pdu: "Segment (TCP) / Datagram (UDP)",
    },
    Layer {
        key: LayerKey::Internet,
        name: "Internet Layer",
        number: "Layer 2",
        badge: "ROUTING",
        summary: "The Internet Layer handles logical addressing and routing. It wraps segments \
                  into packets and adds source and destination IP addresses. Routers operate \
                  at this layer, reading IP headers to forward packets toward their \
                  destination.",
        detail: "IP (Internet Protocol) is the core protocol here. IPv4 uses 32-bit addresses \
                 (like 192.168.1.1) while IPv6 uses 128-bit addresses for a vastly larger \
                 address space.",
        protocols: &[
            proto("IPv4"),
            proto("IPv6"),
            proto("ICMP"),
            proto("ARP"),
            proto("BGP"),
            proto("OSPF"),
        ],
        pdu: "Packet",
    },
    Layer {
        key: LayerKey::Link,
        name: "Link Layer",
        number: "Layer 1",
        badge: "PHYSICAL",
        summary: "The Link Layer (also called Network Access or Network Interface Layer) \
                  handles communication on the local network segment. It wraps packets into \
                  frames with MAC addresses for device-to-device delivery on the same network.",
        detail: "This layer deals with the actual physical transmission, whether over Ethernet \
                 cables, Wi-Fi signals, or fiber optics. It also handles error detection via \
                 checksums (FCS).",
        protocols: &[
            proto("Ethernet"),
            proto("Wi-Fi (802.11)"),
            proto("PPP"),
            proto("ARP"),
            proto("MAC"),
        ],
        pdu: "Frame / Bit",
    },
];

pub fn layer(key: LayerKey) -> &'static Layer {
    match key {
        LayerKey::Application => &LAYERS[0],
        LayerKey::Transport => &LAYERS[1],
        LayerKey::Internet => &LAYERS[2],
        LayerKey::Link => &LAYERS[3],
    }
}
