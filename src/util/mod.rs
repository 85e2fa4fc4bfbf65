use std::fmt;

const COLUMNS: usize = 16;

/// Map a byte to the character shown in a dump's ASCII column: the high bit
/// is ignored, and anything outside 0x20..=0x7E becomes '.'.
#[inline]
pub fn printable(b: u8) -> char {
    match b & 0x7F {
        c @ 0x20..=0x7E => c as char,
        _ => '.',
    }
}

/// Write a hexdump of the provided byte slice in rows of 16: the hex values,
/// then the same bytes as ASCII.  Every row, including the last, ends with a
/// newline.  A 256-byte sector makes a 16x16 grid.
pub fn hexdump(f: &mut fmt::Formatter, buffer: &[u8]) -> fmt::Result {
    for row in buffer.chunks(COLUMNS) {
        // Print hex representation
        for b in row {
            write!(f, "{:02X} ", b)?;
        }
        for _ in row.len()..COLUMNS {
            write!(f, "   ")?;
        }

        // Print ASCII representation
        for b in row {
            write!(f, "{}", printable(*b))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

pub struct Hex<'a>(pub &'a [u8]);
impl<'a> fmt::Display for Hex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        hexdump(f, self.0)
    }
}

pub fn hex(bytes: &[u8]) -> Hex {
    Hex(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_grid() {
        let sector: Vec<u8> = (0..=255u8).collect();
        let dump = hex(&sector).to_string();
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(rows.len(), 16);
        assert_eq!(
            rows[0],
            "00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F ................"
        );
        assert_eq!(
            rows[4],
            "40 41 42 43 44 45 46 47 48 49 4A 4B 4C 4D 4E 4F @ABCDEFGHIJKLMNO"
        );
        // High-bit characters are shown with the high bit stripped.
        assert!(rows[12].ends_with("@ABCDEFGHIJKLMNO"));
        assert!(rows[15].ends_with("pqrstuvwxyz{|}~."));
        assert!(dump.ends_with('\n'));
    }

    #[test]
    fn test_short_row() {
        assert_eq!(hex(&[0xC8, 0x49]).to_string(), format!("C8 49 {}HI\n", "   ".repeat(14)));
        assert_eq!(hex(&[]).to_string(), "");
    }
}
