use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 1,
        fps: Fps::new(100, 1).unwrap(),
    }
}

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA::filled(2, 1, [v, v, v, 255])
}

#[test]
fn in_memory_sink_keeps_order_and_config() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.push_frame(FrameIndex(3), &frame(2)).unwrap();
    sink.end().unwrap();

    assert!(sink.ended());
    assert_eq!(sink.config(), Some(cfg()));
    let idx = sink.frames().iter().map(|(i, _)| i.0).collect::<Vec<_>>();
    assert_eq!(idx, vec![0, 3]);
}

#[test]
fn latest_sink_overwrites_and_shares() {
    let mut sink = LatestFrameSink::new();
    let viewer = sink.clone();
    assert!(viewer.latest().is_none());
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(9)).unwrap();
    let (idx, f) = viewer.latest().unwrap();
    assert_eq!(idx, FrameIndex(1));
    assert_eq!(f.pixel(1, 0), Some([9, 9, 9, 255]));
}
