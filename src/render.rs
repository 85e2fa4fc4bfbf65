//! Turn a file's data sectors into readable output.

use std::io::{self, Write};

use crate::applesoft;
use crate::disk::directory::FileType;
use crate::disk::file::File;
use crate::util;

/// Text files mark line ends with a carriage return, high bit set.
const TEXT_LINE_END: u8 = 0x8D;

/// The ways a file's contents can be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Renderer {
    /// Plain text with the high bit stripped.
    Text,
    /// A detokenized Applesoft BASIC listing.
    Applesoft,
    /// A 16x16 hex and ASCII grid per sector.
    HexDump,
}

impl Renderer {
    /// Select the renderer for a file type.  Only text and Applesoft files
    /// have a decoder; everything else is dumped.
    pub fn for_file_type(file_type: FileType) -> Renderer {
        match file_type {
            FileType::Text => Renderer::Text,
            FileType::Applesoft => Renderer::Applesoft,
            _ => Renderer::HexDump,
        }
    }

    pub fn sink(self, writer: &mut dyn Write) -> Sink {
        match self {
            Renderer::Text => Sink::Text(writer),
            Renderer::Applesoft => Sink::Applesoft {
                writer,
                buffer: vec![],
            },
            Renderer::HexDump => Sink::HexDump(writer),
        }
    }
}

/// A consumer of data sectors.  `finish` consumes the sink, so it can only
/// run once.
pub enum Sink<'a> {
    Text(&'a mut dyn Write),
    Applesoft {
        writer: &'a mut dyn Write,
        buffer: Vec<u8>,
    },
    HexDump(&'a mut dyn Write),
}

impl<'a> Sink<'a> {
    pub fn receive(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            Sink::Text(writer) => {
                let text: String = data
                    .iter()
                    .map(|&b| match b {
                        TEXT_LINE_END => '\n',
                        b => (b & 0x7F) as char,
                    })
                    .collect();
                writer.write_all(text.as_bytes())
            }
            Sink::Applesoft { buffer, .. } => {
                buffer.extend_from_slice(data);
                Ok(())
            }
            Sink::HexDump(writer) => write!(writer, "{}", util::hex(data)),
        }
    }

    pub fn finish(self) -> io::Result<()> {
        match self {
            Sink::Text(writer) | Sink::HexDump(writer) => writer.flush(),
            Sink::Applesoft { writer, buffer } => {
                applesoft::detokenize(&buffer, writer)?;
                writer.flush()
            }
        }
    }
}

/// Stream a file through a renderer.  The sink is finished whether or not
/// streaming succeeded; a streaming error takes precedence over an error
/// from finishing.
pub fn render(file: &File, renderer: Renderer, writer: &mut dyn Write) -> io::Result<()> {
    let mut sink = renderer.sink(writer);
    let streamed = file.for_each_sector(|data| sink.receive(data));
    let finished = sink.finish();
    streamed.and(finished)
}
