#![cfg(feature = "fetch")]
//! End-to-end document loading over HTTP against a local test server

use domlens::{profiler, scanner, AnalysisConfig};

#[test]
fn analyzes_a_page_served_over_http() {
    // Skip on CI where network may not be available
    if std::env::var("CI").is_ok() {
        return;
    }

    let server = tiny_http::Server::http("0.0.0.0:0").unwrap();
    let addr = server.server_addr();

    std::thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = tiny_http::Response::from_string(
                "<html><head><title>Hi</title></head><body>\
                 <div style=\"display:none\"><span>ghost</span></div>\
                 <p>Hello world</p>\
                 </body></html>",
            );
            let _ = request.respond(response);
        }
    });

    let url = format!("http://{}", addr);
    let config = AnalysisConfig::default();
    let mut tree = domlens::load_document(&url, &config).expect("Failed to load URL");
    let body = tree.body().expect("body");

    let stats = profiler::profile(&tree, body, &config);
    assert_eq!(stats.tag_counts.get("p"), Some(&1));
    assert_eq!(stats.tag_counts.get("div"), Some(&1));

    let scan = scanner::reveal_hidden(&mut tree, body);
    assert_eq!(scan.highlighted.len(), 1);
    assert_eq!(scan.tally.display_none, 2);
}
