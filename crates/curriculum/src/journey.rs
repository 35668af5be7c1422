//! Steps of the packet-journey simulation: a request is wrapped layer by
//! layer on the client, crosses a router, and is unwrapped on the server.

use serde::Serialize;

use crate::layers::LayerKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hop {
    Router,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "at", rename_all = "snake_case")]
pub enum JourneyStage {
    Encapsulate(LayerKey),
    Transit(Hop),
    Decapsulate(LayerKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyStep {
    pub stage: JourneyStage,
    pub label: &'static str,
    pub log: &'static str,
}

impl JourneyStep {
    const fn new(stage: JourneyStage, label: &'static str, log: &'static str) -> Self {
        Self { stage, label, log }
    }
}

pub fn journey_steps() -> Vec<JourneyStep> {
    use JourneyStage::{Decapsulate, Encapsulate, Transit};
    use LayerKey::{Application, Internet, Link, Transport};

    vec![
        JourneyStep::new(
            Encapsulate(Application),
            "Application",
            "Application Layer creates an HTTP request message: \"GET /index.html\". \
             Adds HTTP headers.",
        ),
        JourneyStep::new(
            Encapsulate(Transport),
            "Transport",
            "Transport Layer (TCP) wraps the message into a segment. Adds source port: 52413, \
             destination port: 80.",
        ),
        JourneyStep::new(
            Encapsulate(Internet),
            "Internet",
            "Internet Layer wraps segment into a packet. Adds source IP: 192.168.1.10 -> \
             dest IP: 93.184.216.34.",
        ),
        JourneyStep::new(
            Encapsulate(Link),
            "Link",
            "Link Layer wraps packet into a frame. Adds MAC addresses for local delivery to \
             router.",
        ),
        JourneyStep::new(
            Transit(Hop::Router),
            "Transit",
            "Router receives frame, strips Link header, reads IP header, forwards packet \
             toward destination.",
        ),
        JourneyStep::new(
            Transit(Hop::Server),
            "Transit",
            "A fresh frame carries the packet across the last link to the server.",
        ),
        JourneyStep::new(
            Decapsulate(Link),
            "Decap",
            "Server's network card accepts the frame, checks the MAC address, and strips the \
             Link header.",
        ),
        JourneyStep::new(
            Decapsulate(Internet),
            "Decap",
            "IP header checked and removed; the segment is handed to TCP.",
        ),
        JourneyStep::new(
            Decapsulate(Transport),
            "Decap",
            "TCP header removed; port 80 routes the message to the web server.",
        ),
        JourneyStep::new(
            Decapsulate(Application),
            "Decap",
            "The web server reads \"GET /index.html\" and prepares the response.",
        ),
    ]
}
