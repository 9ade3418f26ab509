//! Module `native` implements the built‑in functions installed in the global
//! environment, plus the line‑oriented file handle types backing the I/O
//! natives.
//!
//! Natives report failures through [`NativeError`] without any source position;
//! the interpreter attaches the call site's line number when converting them to
//! runtime errors.  `exit` is not an error at all: it surfaces as
//! [`NativeError::Exit`] and unwinds the interpreter cleanly.

use crate::environment::Environment;
use crate::value::Value;
use chrono::Utc;
use log::info;
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::rc::Rc;

/// Failure modes a native function can produce.
#[derive(Debug)]
pub enum NativeError {
    /// A runtime error message, positioned by the interpreter.
    Msg(String),
    /// Clean interpreter shutdown requested via `exit()`.
    Exit,
}

impl NativeError {
    fn msg<S: Into<String>>(s: S) -> Self {
        NativeError::Msg(s.into())
    }
}

type NativeResult<'a> = std::result::Result<Value<'a>, NativeError>;

// ─────────────────────────────────────────────────────────────────────────────
// File handles
// ─────────────────────────────────────────────────────────────────────────────

/// A file opened for line‑by‑line reading.
pub struct ReadHandle {
    name: String,
    lines: io::Lines<BufReader<File>>,
    closed: bool,
}

impl ReadHandle {
    fn open(path: &str) -> std::result::Result<Self, NativeError> {
        let p = Path::new(path);

        if !p.exists() {
            return Err(NativeError::msg(format!(
                "File '{}' does not exist.",
                path
            )));
        }

        if p.is_dir() {
            return Err(NativeError::msg(format!(
                "File '{}' is a directory and cannot be read.",
                path
            )));
        }

        let file = File::open(p).map_err(|e| NativeError::msg(e.to_string()))?;

        Ok(Self {
            name: path.to_owned(),
            lines: BufReader::new(file).lines(),
            closed: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The next line without its terminator, or `None` at end of file.
    fn read_line(&mut self) -> std::result::Result<Option<String>, NativeError> {
        if self.closed {
            return Err(NativeError::msg("Cannot read from a closed file."));
        }

        match self.lines.next() {
            Some(line) => line
                .map(Some)
                .map_err(|e| NativeError::msg(e.to_string())),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

impl std::fmt::Debug for ReadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadHandle")
            .field("name", &self.name)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// A file opened for writing or appending.
#[derive(Debug)]
pub struct WriteHandle {
    name: String,
    file: File,
    closed: bool,
}

impl WriteHandle {
    fn create(path: &str) -> std::result::Result<Self, NativeError> {
        Self::reject_directory(path)?;

        let file = File::create(path).map_err(|e| NativeError::msg(e.to_string()))?;

        Ok(Self {
            name: path.to_owned(),
            file,
            closed: false,
        })
    }

    fn append(path: &str) -> std::result::Result<Self, NativeError> {
        Self::reject_directory(path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| NativeError::msg(e.to_string()))?;

        Ok(Self {
            name: path.to_owned(),
            file,
            closed: false,
        })
    }

    fn reject_directory(path: &str) -> std::result::Result<(), NativeError> {
        if Path::new(path).is_dir() {
            return Err(NativeError::msg(format!(
                "File '{}' is a directory and cannot be written.",
                path
            )));
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `text` followed by a newline.
    fn write_line(&mut self, text: &str) -> std::result::Result<(), NativeError> {
        if self.closed {
            return Err(NativeError::msg("Cannot write to a closed file."));
        }

        self.file
            .write_all(text.as_bytes())
            .and_then(|_| self.file.write_all(b"\n"))
            .map_err(|e| NativeError::msg(e.to_string()))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native function bodies
// ─────────────────────────────────────────────────────────────────────────────

/// Seconds since the Unix epoch, with millisecond precision.
fn native_clock<'a>(_args: &[Value<'a>]) -> NativeResult<'a> {
    Ok(Value::Number(Utc::now().timestamp_millis() as f64 / 1000.0))
}

/// Request clean interpreter shutdown.
fn native_exit<'a>(_args: &[Value<'a>]) -> NativeResult<'a> {
    Err(NativeError::Exit)
}

/// Length of a sequence, or `nil` for any non‑sequence value.
fn native_length<'a>(args: &[Value<'a>]) -> NativeResult<'a> {
    match args[0].sequence_length() {
        Some(len) => Ok(Value::Number(len as f64)),
        None => Ok(Value::Nil),
    }
}

/// One line from standard input, without its terminator.  `nil` at end of
/// input.
fn native_input_line<'a>(_args: &[Value<'a>]) -> NativeResult<'a> {
    let mut line = String::new();

    match io::stdin().read_line(&mut line) {
        Ok(0) => Ok(Value::Nil),
        Ok(_) => {
            if line.ends_with('\n') {
                line.pop();

                if line.ends_with('\r') {
                    line.pop();
                }
            }

            Ok(Value::String(line))
        }
        Err(e) => Err(NativeError::msg(e.to_string())),
    }
}

fn path_arg<'a>(arg: &'a Value<'_>) -> std::result::Result<&'a str, NativeError> {
    match arg {
        Value::String(s) => Ok(s),
        other => Err(NativeError::msg(format!(
            "File path must be a string and '{}' is not.",
            other
        ))),
    }
}

fn native_open_for_read<'a>(args: &[Value<'a>]) -> NativeResult<'a> {
    let path = path_arg(&args[0])?;
    let handle = ReadHandle::open(path)?;

    Ok(Value::ReadHandle(Rc::new(RefCell::new(handle))))
}

fn native_open_for_write<'a>(args: &[Value<'a>]) -> NativeResult<'a> {
    let path = path_arg(&args[0])?;
    let handle = WriteHandle::create(path)?;

    Ok(Value::WriteHandle(Rc::new(RefCell::new(handle))))
}

fn native_open_for_append<'a>(args: &[Value<'a>]) -> NativeResult<'a> {
    let path = path_arg(&args[0])?;
    let handle = WriteHandle::append(path)?;

    Ok(Value::WriteHandle(Rc::new(RefCell::new(handle))))
}

/// One line from a read handle, or `nil` at end of file.
fn native_read_line<'a>(args: &[Value<'a>]) -> NativeResult<'a> {
    match &args[0] {
        Value::ReadHandle(handle) => match handle.borrow_mut().read_line()? {
            Some(line) => Ok(Value::String(line)),
            None => Ok(Value::Nil),
        },
        _ => Err(NativeError::msg(
            "Must pass a file opened for reading to 'readLine'.",
        )),
    }
}

/// Stringify the second argument and write it as one line to a write handle.
fn native_write<'a>(args: &[Value<'a>]) -> NativeResult<'a> {
    match &args[0] {
        Value::WriteHandle(handle) => {
            let text = args[1].to_string();
            handle.borrow_mut().write_line(&text)?;

            Ok(Value::Nil)
        }
        _ => Err(NativeError::msg(
            "Must pass a file opened for writing to 'write'.",
        )),
    }
}

/// Close either kind of handle.  Closing twice is harmless.
fn native_close<'a>(args: &[Value<'a>]) -> NativeResult<'a> {
    match &args[0] {
        Value::ReadHandle(handle) => {
            handle.borrow_mut().close();

            Ok(Value::Nil)
        }
        Value::WriteHandle(handle) => {
            handle.borrow_mut().close();

            Ok(Value::Nil)
        }
        _ => Err(NativeError::msg("Must pass an opened file to 'close'.")),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Installation
// ─────────────────────────────────────────────────────────────────────────────

/// Define every native in `globals`.
pub fn install<'a>(globals: &mut Environment<'a>) {
    let natives: &[(&'static str, usize, crate::value::NativeFn<'a>)] = &[
        ("clock", 0, native_clock),
        ("exit", 0, native_exit),
        ("length", 1, native_length),
        ("inputLine", 0, native_input_line),
        ("openForRead", 1, native_open_for_read),
        ("openForWrite", 1, native_open_for_write),
        ("openForAppend", 1, native_open_for_append),
        ("readLine", 1, native_read_line),
        ("write", 2, native_write),
        ("close", 1, native_close),
    ];

    for (name, arity, func) in natives {
        globals.define(
            name,
            Value::NativeFunction {
                name,
                arity: *arity,
                func: *func,
            },
        );
    }

    info!("Installed {} native functions", natives.len());
}

// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_non_sequence_is_nil() {
        assert_eq!(native_length(&[Value::Number(5.0)]).unwrap(), Value::Nil);
        assert_eq!(native_length(&[Value::Nil]).unwrap(), Value::Nil);
    }

    #[test]
    fn length_of_string_counts_characters() {
        let v = native_length(&[Value::String("héllo".to_owned())]).unwrap();

        assert_eq!(v, Value::Number(5.0));
    }

    #[test]
    fn open_missing_file_reports_name() {
        let err = native_open_for_read(&[Value::String("/no/such/file.txt".to_owned())])
            .unwrap_err();

        match err {
            NativeError::Msg(m) => {
                assert_eq!(m, "File '/no/such/file.txt' does not exist.")
            }
            NativeError::Exit => panic!("unexpected exit"),
        }
    }

    #[test]
    fn open_non_string_path_is_an_error() {
        let err = native_open_for_read(&[Value::Number(1.0)]).unwrap_err();

        match err {
            NativeError::Msg(m) => {
                assert_eq!(m, "File path must be a string and '1' is not.")
            }
            NativeError::Exit => panic!("unexpected exit"),
        }
    }

    #[test]
    fn opening_a_directory_for_writing_names_the_path() {
        let dir = std::env::temp_dir().join("quill-native-dir-test");
        std::fs::create_dir_all(&dir).unwrap();
        let dir_str = dir.to_str().unwrap().to_owned();

        let expected = format!("File '{}' is a directory and cannot be written.", dir_str);

        match native_open_for_write(&[Value::String(dir_str.clone())]).unwrap_err() {
            NativeError::Msg(m) => assert_eq!(m, expected),
            NativeError::Exit => panic!("unexpected exit"),
        }

        match native_open_for_append(&[Value::String(dir_str)]).unwrap_err() {
            NativeError::Msg(m) => assert_eq!(m, expected),
            NativeError::Exit => panic!("unexpected exit"),
        }
    }

    #[test]
    fn write_then_read_round_trip() {
        let dir = std::env::temp_dir().join("quill-native-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lines.txt");
        let path_str = path.to_str().unwrap().to_owned();

        let handle = native_open_for_write(&[Value::String(path_str.clone())]).unwrap();
        native_write(&[handle.clone(), Value::String("first".to_owned())]).unwrap();
        native_write(&[handle.clone(), Value::Number(2.0)]).unwrap();
        native_close(&[handle]).unwrap();

        let reader = native_open_for_read(&[Value::String(path_str)]).unwrap();
        assert_eq!(
            native_read_line(std::slice::from_ref(&reader)).unwrap(),
            Value::String("first".to_owned())
        );
        assert_eq!(
            native_read_line(std::slice::from_ref(&reader)).unwrap(),
            Value::String("2".to_owned())
        );
        assert_eq!(
            native_read_line(std::slice::from_ref(&reader)).unwrap(),
            Value::Nil
        );

        native_close(std::slice::from_ref(&reader)).unwrap();

        let err = native_read_line(std::slice::from_ref(&reader)).unwrap_err();
        match err {
            NativeError::Msg(m) => assert_eq!(m, "Cannot read from a closed file."),
            NativeError::Exit => panic!("unexpected exit"),
        }
    }
}
