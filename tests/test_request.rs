use tempest::http::request::Method;

#[test]
fn test_method_round_trips_through_token() {
    for token in ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "MKCOL"] {
        assert_eq!(Method::parse(token).as_str(), token);
    }
}

#[test]
fn test_only_get_and_post_are_servable() {
    assert!(Method::GET.is_servable());
    assert!(Method::POST.is_servable());
    assert!(!Method::DELETE.is_servable());
    assert!(!Method::HEAD.is_servable());
    assert!(!Method::Extension("BREW".to_string()).is_servable());
}
