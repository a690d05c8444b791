use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use courseforge::curriculum::{
    AssetKind, CourseId, Curriculum, CurriculumBackend, HttpBackend, LocalAsset, SyncError,
    SyncGateway,
};

struct Recorded {
    request_line: String,
    headers: Vec<String>,
    body: Vec<u8>,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.headers.iter().find_map(|h| {
            h.to_ascii_lowercase()
                .starts_with(&prefix)
                .then(|| h[prefix.len()..].trim().to_string())
        })
    }
}

/// Answers exactly one request with `status` and `body`, then records it.
fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            headers.push(line);
        }

        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();

        write!(
            stream,
            "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        Recorded {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: request_body,
        }
    });

    (format!("http://{addr}/api"), handle)
}

#[test]
fn fetch_decodes_curriculum_and_sends_token() {
    let (url, server) = serve_once(
        200,
        r#"{"sections":[{"id":3,"title":"Intro","order":1,"lectures":[{"id":"l1","title":"Hello","order":1,"content":[{"id":9,"type":"external-link","title":"Docs","order":1,"url":"https://docs.rs"}]}]}]}"#,
    );
    let backend = HttpBackend::new(&url, "secret");

    let curriculum = backend.fetch(&CourseId::new("7")).unwrap().unwrap();
    let request = server.join().unwrap();

    assert_eq!(request.request_line, "GET /api/curriculum/7/ HTTP/1.1");
    assert_eq!(request.header("authorization").as_deref(), Some("Bearer secret"));
    assert_eq!(curriculum.sections[0].id.as_str(), "3");
    assert_eq!(curriculum.sections[0].lectures[0].content[0].id.as_str(), "9");
}

#[test]
fn not_found_loads_default_tree() {
    let (url, server) = serve_once(404, r#"{"detail":"Not found."}"#);
    let gateway = SyncGateway::new(HttpBackend::new(&url, "secret"));

    let curriculum = gateway.load(&CourseId::new("7")).unwrap();
    server.join().unwrap();

    assert_eq!(curriculum.sections.len(), 1);
    assert_eq!(curriculum.sections[0].order, 1);
}

#[test]
fn rejected_token_is_unauthorized() {
    let (url, server) = serve_once(401, r#"{"detail":"Token expired"}"#);
    let backend = HttpBackend::new(&url, "stale");

    let err = backend.fetch(&CourseId::new("7")).unwrap_err();
    server.join().unwrap();

    assert!(err.is_auth());
}

#[test]
fn final_save_puts_whole_tree() {
    let (url, server) = serve_once(200, "{}");
    let backend = HttpBackend::new(&url, "secret");
    let tree = Curriculum::empty();

    backend.replace(&CourseId::new("7"), &tree).unwrap();
    let request = server.join().unwrap();

    assert_eq!(request.request_line, "PUT /api/curriculum/7/ HTTP/1.1");
    let sent: Curriculum = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent, tree);
}

#[test]
fn draft_save_posts_to_draft_endpoint() {
    let (url, server) = serve_once(201, "{}");
    let backend = HttpBackend::new(&url, "secret");

    backend
        .replace_draft(&CourseId::new("7"), &Curriculum::empty())
        .unwrap();
    let request = server.join().unwrap();

    assert_eq!(request.request_line, "POST /api/curriculum/7/draft/ HTTP/1.1");
}

#[test]
fn server_error_is_reported_with_status() {
    let (url, server) = serve_once(500, r#"{"detail":"boom"}"#);
    let backend = HttpBackend::new(&url, "secret");

    let err = backend
        .replace(&CourseId::new("7"), &Curriculum::empty())
        .unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, SyncError::Server { status: 500 }));
}

#[test]
fn upload_sends_multipart_and_returns_hosted_url() {
    let (url, server) = serve_once(200, r#"{"hosted_url":"https://vimeo.com/555"}"#);
    let backend = HttpBackend::new(&url, "secret");
    let asset = LocalAsset::new("intro.mp4", "video/mp4", b"frames".to_vec());

    let hosted = backend.upload(AssetKind::Video, &asset).unwrap();
    let request = server.join().unwrap();

    assert_eq!(hosted.hosted_url, "https://vimeo.com/555");
    assert_eq!(request.request_line, "POST /api/uploads/video/ HTTP/1.1");
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    let body = String::from_utf8(request.body).unwrap();
    assert!(body.contains("filename=\"intro.mp4\""));
    assert!(body.contains("frames"));
}

#[test]
fn line_breaks_in_file_name_stay_inside_the_part_header() {
    let (url, server) = serve_once(200, r#"{"hosted_url":"https://files.local/1/x"}"#);
    let backend = HttpBackend::new(&url, "secret");
    let asset = LocalAsset::new("x.mp4\r\nX-Injected: 1", "video/mp4", b"frames".to_vec());

    backend.upload(AssetKind::File, &asset).unwrap();
    let request = server.join().unwrap();

    let body = String::from_utf8(request.body).unwrap();
    assert!(!body.contains("\r\nX-Injected"));
    assert!(body.contains("frames"));
}

#[test]
fn upload_with_rejected_token_is_unauthorized() {
    let (url, server) = serve_once(403, r#"{"detail":"Forbidden"}"#);
    let backend = HttpBackend::new(&url, "stale");
    let asset = LocalAsset::new("intro.mp4", "video/mp4", b"frames".to_vec());

    let err = backend.upload(AssetKind::Video, &asset).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, SyncError::Unauthorized { status: 403 }));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(&format!("http://{addr}/api"), "secret");
    let err = backend.fetch(&CourseId::new("7")).unwrap_err();

    assert!(matches!(err, SyncError::Transport(_)));
}
