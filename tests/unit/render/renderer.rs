use std::io::Cursor;
use std::sync::Arc;

use super::*;
use crate::{assets::source::MemorySource, config::reel::SequenceSpec};

fn png(rgba: [u8; 4]) -> Vec<u8> {
    png_sized(4, 2, rgba)
}

fn png_sized(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Three frames; frame 2 is missing from the source.
fn store() -> FrameStore {
    let seq = SequenceSpec {
        frame_count: 3,
        ..SequenceSpec::default()
    };
    let mut src = MemorySource::new();
    src.insert(&seq.frame_path(FrameIndex(0)), png([255, 0, 0, 255]))
        .unwrap();
    src.insert(&seq.frame_path(FrameIndex(1)), png([0, 255, 0, 255]))
        .unwrap();
    FrameStore::new(seq, Arc::new(src))
}

fn renderer() -> Renderer {
    Renderer::new(Surface::new(Canvas::new(8, 8), None).unwrap())
}

#[test]
fn ready_frame_draws_immediately() {
    let mut store = store();
    store.preload();
    store.wait_all();

    let mut r = renderer();
    let out = r.draw_frame(FrameIndex(1), &store).unwrap();
    let DrawOutcome::Drawn(fit) = out else {
        panic!("expected draw, got {out:?}");
    };
    assert!(fit.covers(8.0, 8.0, 1e-9));
    assert_eq!(r.stats().draws, 1);
    assert_eq!(r.awaiting(), None);

    let px = r.snapshot().pixel(4, 4).unwrap();
    assert!(px[1] > 250 && px[0] < 5, "{px:?}");
}

#[test]
fn pending_frame_defers_until_loaded() {
    let mut store = store();
    let mut r = renderer();

    assert_eq!(
        r.draw_frame(FrameIndex(0), &store).unwrap(),
        DrawOutcome::Deferred
    );
    assert_eq!(r.awaiting(), Some(FrameIndex(0)));
    assert_eq!(r.stats().draws, 0);

    store.preload();
    let settled = store.wait_all();
    let out = r.on_loaded(&settled, &store).unwrap();
    assert!(matches!(out, Some(DrawOutcome::Drawn(_))));
    assert_eq!(r.awaiting(), None);
    assert_eq!(r.stats().draws, 1);
}

#[test]
fn newer_request_replaces_awaited_frame() {
    let mut store = store();
    let mut r = renderer();

    r.draw_frame(FrameIndex(0), &store).unwrap();
    r.draw_frame(FrameIndex(1), &store).unwrap();
    assert_eq!(r.awaiting(), Some(FrameIndex(1)));

    store.preload();
    store.wait_all();

    // A late completion for frame 0 must not paint over frame 1.
    assert_eq!(r.on_loaded(&[FrameIndex(0)], &store).unwrap(), None);
    assert_eq!(r.stats().draws, 0);

    let out = r.on_loaded(&[FrameIndex(1)], &store).unwrap();
    assert!(matches!(out, Some(DrawOutcome::Drawn(_))));
    let px = r.snapshot().pixel(0, 0).unwrap();
    assert!(px[1] > 250 && px[0] < 5, "{px:?}");
}

#[test]
fn failed_frame_is_skipped_silently() {
    let mut store = store();
    store.preload();
    store.wait_all();

    let mut r = renderer();
    assert_eq!(
        r.draw_frame(FrameIndex(2), &store).unwrap(),
        DrawOutcome::Skipped
    );
    assert_eq!(r.awaiting(), None);
    assert!(r.snapshot().data.iter().all(|&b| b == 0));
}

#[test]
fn out_of_range_index_is_skipped() {
    let store = store();
    let mut r = renderer();
    assert_eq!(
        r.draw_frame(FrameIndex(99), &store).unwrap(),
        DrawOutcome::Skipped
    );
}

#[test]
fn resize_redraws_at_new_size() {
    let mut store = store();
    store.preload();
    store.wait_all();

    let mut r = renderer();
    r.draw_frame(FrameIndex(0), &store).unwrap();
    r.resize(Canvas::new(16, 4)).unwrap();
    assert!(r.snapshot().data.iter().all(|&b| b == 0));

    let out = r.draw_frame(FrameIndex(0), &store).unwrap();
    let DrawOutcome::Drawn(fit) = out else {
        panic!("expected draw, got {out:?}");
    };
    assert_eq!(fit.scale, 4.0);
    assert_eq!(r.canvas(), Canvas::new(16, 4));
    assert_eq!(r.stats().draws, 2);
}

#[test]
fn oversized_frame_fails_its_load_and_is_skipped() {
    let seq = SequenceSpec {
        frame_count: 1,
        ..SequenceSpec::default()
    };
    let mut src = MemorySource::new();
    src.insert(&seq.frame_path(FrameIndex(0)), png_sized(70_000, 1, [255, 0, 0, 255]))
        .unwrap();
    let mut store = FrameStore::new(seq, Arc::new(src));
    store.preload();

    let mut r = renderer();
    assert_eq!(
        r.draw_frame(FrameIndex(0), &store).unwrap(),
        DrawOutcome::Deferred
    );
    let settled = store.wait_all();
    assert!(matches!(
        store.state(FrameIndex(0)),
        Some(LoadState::Failed(_))
    ));

    // The awaited frame settled as failed: nothing is drawn and no error escapes.
    assert_eq!(
        r.on_loaded(&settled, &store).unwrap(),
        Some(DrawOutcome::Skipped)
    );
    assert_eq!(
        r.draw_frame(FrameIndex(0), &store).unwrap(),
        DrawOutcome::Skipped
    );
    assert_eq!(r.stats().draws, 0);
    assert_eq!(r.stats().skipped, 2);
}

#[test]
fn drawing_does_not_retain_frame_pixels() {
    let mut store = store();
    store.preload();
    store.wait_all();

    let mut r = renderer();
    for _ in 0..3 {
        for i in 0..2 {
            r.draw_frame(FrameIndex(i), &store).unwrap();
        }
    }
    assert_eq!(r.stats().draws, 6);

    // The store holds the only reference to each frame's pixels.
    for i in 0..2 {
        let frame = store.get(FrameIndex(i)).unwrap();
        assert_eq!(Arc::strong_count(frame.pixmap()), 1);
    }
}
