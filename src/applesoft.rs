//! Applesoft BASIC detokenizer.
//!
//! A tokenized program starts with a little-endian byte length, followed by
//! line records.  Each record holds the memory address of the next line
//! (ignored here), a little-endian line number, and the line's bytes up to a
//! terminating zero.  Bytes at or above 0x80 are keyword tokens.

use std::io::{self, Write};

use crate::disk::DiskError;

/// Return the keyword for a token byte.  The table is sparse: bytes in the
/// token range without an entry here return None.
pub fn keyword(token: u8) -> Option<&'static str> {
    Some(match token {
        0x80 => "END",
        0x81 => "FOR",
        0x82 => "NEXT",
        0x83 => "DATA",
        0x84 => "INPUT",
        0x86 => "DIM",
        0x87 => "READ",
        0x89 => "TEXT",
        0x8A => "PR #",
        0x8B => "IN #",
        0x8C => "CALL",
        0x91 => "HGR",
        0x92 => "HCOLOR=",
        0x93 => "HPLOT",
        0x96 => "HTAB",
        0x97 => "HOME",
        0x9D => "NORMAL",
        0x9E => "INVERSE",
        0xA2 => "VTAB",
        0xA3 => "HIMEM:",
        0xA5 => "ONERR",
        0xAB => "GOTO",
        0xAD => "IF",
        0xB0 => "GOSUB",
        0xB1 => "RETURN",
        0xB2 => "REM",
        0xB4 => "ON",
        0xB9 => "POKE",
        0xBA => "PRINT",
        0xBD => "CLEAR",
        0xBE => "GET",
        0xC0 => "TAB",
        0xC1 => "TO",
        0xC3 => "SPC(",
        0xC4 => "THEN",
        0xC7 => "STEP",
        0xC8 => "+",
        0xC9 => "-",
        0xCA => "*",
        0xCB => "/",
        0xCC => ";",
        0xCD => "AND",
        0xCE => "OR",
        0xCF => ">",
        0xD0 => "=",
        0xD1 => "<",
        0xD2 => "SGN",
        0xD3 => "INT",
        0xD4 => "ABS",
        0xD6 => "FRE",
        0xDA => "SQR",
        0xDB => "RND",
        0xE1 => "ATN",
        0xE2 => "PEEK",
        0xE3 => "LEN",
        0xE4 => "STR$",
        0xE5 => "VAL",
        0xE7 => "CHR$",
        _ => return None,
    })
}

/// Builds one listing line, separating keywords from their neighbours by a
/// single space.
struct Line {
    text: String,
    space_owed: bool,
}

impl Line {
    fn new(line_number: u16) -> Line {
        Line {
            text: format!("{} ", line_number),
            space_owed: false,
        }
    }

    fn push_literal(&mut self, c: char) {
        if self.space_owed && c != ' ' {
            self.text.push(' ');
        }
        self.space_owed = false;
        self.text.push(c);
    }

    /// Keywords get one separating space on each side; a literal space
    /// already next to the keyword counts toward it instead of doubling up.
    fn push_keyword(&mut self, keyword: &str) {
        if self.space_owed || !self.text.ends_with(' ') {
            self.text.push(' ');
        }
        self.text.push_str(keyword);
        self.space_owed = true;
    }

    fn finish(mut self) -> String {
        self.text.push('\n');
        self.text
    }
}

struct Detokenizer<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> Detokenizer<'a> {
    fn read_byte(&mut self) -> io::Result<u8> {
        match self.data.get(self.index) {
            Some(&b) => {
                self.index += 1;
                Ok(b)
            }
            None => Err(DiskError::TruncatedProgram.into()),
        }
    }

    fn read_word(&mut self) -> io::Result<u16> {
        let low = self.read_byte()?;
        let high = self.read_byte()?;
        Ok(u16::from_le_bytes([low, high]))
    }

    fn read_line(&mut self) -> io::Result<String> {
        let _next_line_address = self.read_word()?;
        let mut line = Line::new(self.read_word()?);
        loop {
            match self.read_byte()? {
                0x00 => return Ok(line.finish()),
                b if b <= 0x7F => line.push_literal(b as char),
                token => match keyword(token) {
                    Some(keyword) => line.push_keyword(keyword),
                    None => return Err(DiskError::UnknownToken(token).into()),
                },
            }
        }
    }
}

/// Write the source listing of a tokenized program.  Lines are read while
/// the read offset is below the leading length word, so the length bounds
/// the walk by bytes, not by line count.  Lines already written stay
/// written if a later line fails.
pub fn detokenize(data: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut detokenizer = Detokenizer { data, index: 0 };
    let length = detokenizer.read_word()? as usize;
    while detokenizer.index < length {
        let line = detokenizer.read_line()?;
        writer.write_all(line.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a tokenized program from (line number, bytes) pairs.
    fn program(lines: &[(u16, &[u8])]) -> Vec<u8> {
        let mut body = vec![];
        let mut address = 0x0801u16;
        for &(number, bytes) in lines {
            address += 4 + bytes.len() as u16 + 1;
            body.extend_from_slice(&address.to_le_bytes());
            body.extend_from_slice(&number.to_le_bytes());
            body.extend_from_slice(bytes);
            body.push(0x00);
        }
        let mut data = ((body.len() + 2) as u16).to_le_bytes().to_vec();
        data.extend(body);
        data
    }

    fn listing(data: &[u8]) -> io::Result<String> {
        let mut output = vec![];
        detokenize(data, &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_print_line() {
        let data = program(&[(10, &[0xBA, b' ', b'"', b'H', b'I', b'"'])]);
        assert_eq!(listing(&data).unwrap(), "10 PRINT \"HI\"\n");
    }

    #[test]
    fn test_keyword_spacing() {
        let data = program(&[
            (10, &[0x81, b'I', 0xD0, b'1', 0xC1, b'1', b'0']),
            (20, &[0x82]),
            (30, &[0xAD, b'X', 0xCF, b'3', 0xC4, 0xAB, b'1', b'0']),
            (40, &[0x8A, b'6']),
            (50, &[0x97, b':', 0xB9, b'2', b'3', b'2', b',', b'0']),
        ]);
        assert_eq!(
            listing(&data).unwrap(),
            "10 FOR I = 1 TO 10\n\
             20 NEXT\n\
             30 IF X > 3 THEN GOTO 10\n\
             40 PR # 6\n\
             50 HOME : POKE 232,0\n"
        );
    }

    #[test]
    fn test_literal_spaces_beside_keywords() {
        let data = program(&[(20, &[b'A', b' ', 0xC4, 0xAB, b'5', b' ', b' ', 0xB1])]);
        assert_eq!(listing(&data).unwrap(), "20 A THEN GOTO 5  RETURN\n");
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(listing(&[0x02, 0x00]).unwrap(), "");
        // Trailing bytes past the length word are not read.
        assert_eq!(listing(&[0x02, 0x00, 0xFF, 0xFF]).unwrap(), "");
    }

    #[test]
    fn test_unknown_token() {
        let data = program(&[(10, &[0xBA]), (20, &[0x85])]);
        let mut output = vec![];
        let e = detokenize(&data, &mut output).unwrap_err();
        assert_eq!(e, DiskError::UnknownToken(0x85));
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        // The first line was already emitted.
        assert_eq!(output, b"10 PRINT\n");
    }

    #[test]
    fn test_truncated_program() {
        let mut data = program(&[(10, &[0xBA, b'1'])]);
        data.truncate(data.len() - 1);
        assert_eq!(
            listing(&data).unwrap_err(),
            DiskError::TruncatedProgram
        );
        assert_eq!(listing(&[0x02]).unwrap_err(), DiskError::TruncatedProgram);
    }

    #[test]
    fn test_sparse_table() {
        assert_eq!(keyword(0xBA), Some("PRINT"));
        assert_eq!(keyword(0xE7), Some("CHR$"));
        for unmapped in [0x85u8, 0x88, 0x8D, 0xA0, 0xD5, 0xE8, 0xFF] {
            assert_eq!(keyword(unmapped), None);
        }
        assert_eq!((0x80..=0xFFu8).filter_map(keyword).count(), 58);
    }
}
