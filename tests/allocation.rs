// Runs alone in its own binary: the global allocator below counts live bytes per thread.
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use ads_context as ads;
use ads::{ConnectionContext, LdapSession, Policy, SaslState};

struct Counting;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn track(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            track(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        track(-(layout.size() as isize));
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new = System.realloc(ptr, layout, new_size);
        if !new.is_null() {
            track(new_size as isize - layout.size() as isize);
        }
        new
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn live_bytes() -> isize {
    LIVE.with(|live| live.get())
}

struct Session;

impl LdapSession for Session {
    fn disconnect(&mut self) {}
}

fn init_and_destroy(policy: &Policy) {
    let mut handle = Some(ConnectionContext::init(
        Some("EXAMPLE.COM"),
        Some("EXAMPLE"),
        Some("dc1.example.com"),
        SaslState::Seal,
        policy,
    ));
    if let Some(ctx) = handle.as_mut() {
        ctx.auth.password = Some("secret".to_string());
        ctx.auth.ccache_name = Some("MEMORY:ads".to_string());
        ctx.config.server_site_name = Some("Default-First-Site-Name".to_string());
        let _ = ctx.derive_bind_path();
        ctx.attach_session(Box::new(Session));
    }
    ads::destroy(&mut handle);
    assert!(handle.is_none());
}

#[test]
fn test_init_destroy_releases_everything() {
    let policy = Policy::default();
    // warm up any lazily initialised state
    init_and_destroy(&policy);

    let before = live_bytes();
    init_and_destroy(&policy);
    assert_eq!(live_bytes(), before);

    let before = live_bytes();
    let path = ads::build_dn("a.b.c").unwrap();
    drop(path);
    assert_eq!(live_bytes(), before);
}
