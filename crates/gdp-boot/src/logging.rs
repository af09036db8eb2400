use std::io::Write;

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {{
        print!($($arg)*);
        stdout().flush()?;
    }};
}

#[macro_export]
macro_rules! status {
    ($code:expr) => {{
        let ret = $code;
        match &ret {
            Ok(_) => println!("{}", "ok".green()),
            Err(_) => println!("{}", "failed".red()),
        }
        ret
    }};
}

/// 16 bytes per line, prefixed with the offset.
pub fn hexdump<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    for (i, line) in data.chunks(16).enumerate() {
        write!(w, "{:04x}:", i * 16)?;
        for byte in line {
            write!(w, " {byte:02x}")?;
        }
        writeln!(w)?;
    }

    Ok(())
}
