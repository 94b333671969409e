use ads_context as ads;

#[test]
fn test_dn_from_dotted_realm() {
    assert_eq!(ads::build_dn("example.com").unwrap(), "dc=example,dc=com");
}

#[test]
fn test_reverse_path() {
    assert_eq!(
        ads::build_path("a.b.c", ".", "dc=", true).unwrap(),
        "dc=c,dc=b,dc=a"
    );
}

#[test]
fn test_domain_from_dn() {
    assert_eq!(ads::build_domain("dc=example,dc=com"), "example.com");
}

#[test]
fn test_empty_name_is_not_an_error() {
    let out = ads::build_path("", ".", "dc=", false).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_name_without_separator() {
    assert_eq!(
        ads::build_path("localhost", ".", "cn=", false).unwrap(),
        "cn=localhost"
    );
}

#[test]
fn test_deep_realm() {
    let realm = "eu.corp.ad.example.org";
    let dn = ads::build_dn(realm).unwrap();
    assert_eq!(dn, "dc=eu,dc=corp,dc=ad,dc=example,dc=org");
    assert_eq!(ads::build_domain(&dn), realm);
}

// Known limitation: the domain rewrite is textual, so a `dc=` inside a value is lost.
#[test]
fn test_domain_rewrite_is_textual() {
    let dn = ads::build_dn("xdc=y.com").unwrap();
    assert_eq!(dn, "dc=xdc=y,dc=com");
    assert_eq!(ads::build_domain(&dn), "xy.com");
}
