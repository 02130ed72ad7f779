#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// Starts a loopback HTTP server that answers `GET <path>` with the canned
/// `(status, body)` for that path, and 404 for anything else.
///
/// Returns the base URL, e.g. `http://127.0.0.1:40123`. The server thread is
/// detached and lives until the test process exits.
pub fn spawn_server(routes: &[(&str, u16, &str)]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind loopback");
    let addr = listener.local_addr().expect("no local addr");
    let routes: HashMap<String, (u16, String)> = routes
        .iter()
        .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
        .collect();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            handle(stream, &routes);
        }
    });

    format!("http://{addr}")
}

fn handle(stream: TcpStream, routes: &HashMap<String, (u16, String)>) {
    let mut reader = BufReader::new(match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    });

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = routes
        .get(path)
        .cloned()
        .unwrap_or((404, "not found".to_string()));

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/yaml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
