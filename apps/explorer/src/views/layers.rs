use std::io::{self, Write};

use curriculum::Layer;

/// Text card for one layer: header, both paragraphs, protocols, PDU.
pub fn write_layer(out: &mut impl Write, layer: &Layer) -> io::Result<()> {
    writeln!(out, "{} · {}  [{}]", layer.number, layer.name, layer.badge)?;
    writeln!(out)?;
    writeln!(out, "  {}", layer.summary)?;
    writeln!(out)?;
    writeln!(out, "  {}", layer.detail)?;
    writeln!(out)?;
    writeln!(out, "  Protocols:")?;
    for protocol in layer.protocols {
        match protocol.title {
            Some(title) => writeln!(out, "    {:<8} {title}", protocol.name)?,
            None => writeln!(out, "    {}", protocol.name)?,
        }
    }
    writeln!(out, "  PDU: {}", layer.pdu)
}

/// Several cards in order, separated by a blank line.
pub fn write_stack(out: &mut impl Write, layers: &[&Layer]) -> io::Result<()> {
    for (position, layer) in layers.iter().enumerate() {
        if position > 0 {
            writeln!(out)?;
        }
        write_layer(out, layer)?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, layers: &[&Layer]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, layers)?;
    writeln!(out).map_err(serde_json::Error::io)
}
