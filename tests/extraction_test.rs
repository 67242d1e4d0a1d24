// tests/extraction_test.rs

mod common;

use common::*;
use gaodun_dl::{
    error::AppError,
    models::{CourseSchema, MediaKind},
};
use std::{path::Path, sync::Arc, time::Duration};

/// 根节点挂两个子章节，子章节与根节点各自带资源
fn sample_tree() -> (MockGateway, MockExpander) {
    let mut gateway = MockGateway::default();
    let mut expander = MockExpander::default();
    register_video(&mut gateway, &mut expander, "v1");

    let mut c1 = node("第一章");
    c1.in_class_main_resource = vec![video("1", "1.1 导论", "v1"), note("2", "讲义一", "https://cdn.example.com/n1.pdf")];
    let mut c2 = node("第二章");
    c2.pre_class_resource = vec![note("3", "预习: 资料", "https://cdn.example.com/n2.pdf")];
    let mut root = node("根");
    root.children = vec![c1, c2];
    root.after_class_resource = vec![note("4", "课后练习", "https://cdn.example.com/n3.pdf")];

    gateway.gradations = vec![gstudy_gradation("基础阶段", "s1")];
    gateway.gstudy_syllabi.insert("s1".into(), root);
    (gateway, expander)
}

#[tokio::test]
async fn test_gstudy_walk_is_count_exact_and_tree_ordered() {
    let (gateway, expander) = sample_tree();
    let extraction = extractor(Arc::new(gateway), expander, 4)
        .extract("https://www.gaodun.com/course/?course_id=555")
        .await
        .unwrap();

    assert_eq!(extraction.course_id, "555");
    assert_eq!(extraction.schema, CourseSchema::GStudy);
    assert!(extraction.failures.is_empty());

    let titles: Vec<_> = extraction.media.iter().map(|m| m.title.clone()).collect();
    assert_eq!(
        titles,
        vec![
            Path::new("555/基础阶段/第一章/1.1 导论").to_path_buf(),
            Path::new("555/基础阶段/第一章/讲义一").to_path_buf(),
            Path::new("555/基础阶段/第二章/预习- 资料").to_path_buf(),
            Path::new("555/基础阶段/根/课后练习").to_path_buf(),
        ]
    );

    let video = &extraction.media[0];
    assert_eq!(video.kind, MediaKind::Video);
    let stream = &video.streams["v1_SD"];
    assert_eq!(stream.quality, "640x360");
    assert_eq!(stream.size, 100 * 1024);
    assert_eq!(stream.parts.len(), 2);
    assert_eq!(stream.parts[0].url, "https://cdn.example.com/v1/0.ts");

    let doc = &extraction.media[1];
    assert_eq!(doc.kind, MediaKind::Document);
    assert_eq!(doc.streams["2"].ext, "pdf");
    assert_eq!(doc.streams["2"].size, 2048);
    assert_eq!(doc.streams["2"].quality, "Unknown");
}

#[tokio::test]
async fn test_unknown_discriminator_and_missing_path_contribute_nothing() {
    let mut gateway = MockGateway::default();
    let mut root = node("根");
    let mut exam = note("1", "随堂测验", "https://cdn.example.com/q");
    exam.discriminator = "exam".into();
    root.in_class_main_resource = vec![exam, note("2", "空讲义", "")];
    gateway.gradations = vec![gstudy_gradation("阶段", "s1")];
    gateway.gstudy_syllabi.insert("s1".into(), root);

    let extraction = extractor(Arc::new(gateway), MockExpander::default(), 4)
        .extract_course("1")
        .await
        .unwrap();
    assert!(extraction.media.is_empty());
    assert!(extraction.failures.is_empty());
}

#[tokio::test]
async fn test_video_without_usable_quality_is_a_branch_failure() {
    let mut gateway = MockGateway::default();
    let mut expander = MockExpander::default();
    gateway.videos.insert(
        "dead".into(),
        video_info(
            "失效视频",
            vec![
                ("HD", quality("https://cdn.example.com/hd.m3u8", 0, "1280x720")),
                ("SD", quality("", 1, "640x360")),
            ],
        ),
    );
    // 清单无法展开的清晰度同样被跳过
    gateway.videos.insert(
        "broken".into(),
        video_info("坏清单", vec![("SD", quality("https://cdn.example.com/broken.m3u8", 1, "640x360"))]),
    );
    register_video(&mut gateway, &mut expander, "ok");

    let mut root = node("根");
    root.in_class_main_resource = vec![
        video("1", "失效视频", "dead"),
        video("2", "坏清单", "broken"),
        video("3", "正常视频", "ok"),
    ];
    gateway.gradations = vec![gstudy_gradation("阶段", "s1")];
    gateway.gstudy_syllabi.insert("s1".into(), root);

    let extraction = extractor(Arc::new(gateway), expander, 4)
        .extract_course("9")
        .await
        .unwrap();
    assert_eq!(extraction.media.len(), 1);
    assert_eq!(extraction.media[0].title, Path::new("9/阶段/根/正常视频"));
    assert_eq!(extraction.failures.len(), 2);
    assert!(extraction
        .failures
        .iter()
        .all(|f| matches!(f.error, AppError::NoStreams { .. })));
}

#[tokio::test]
async fn test_live_playback_exchange() {
    let mut gateway = MockGateway::default();
    let mut expander = MockExpander::default();
    register_video(&mut gateway, &mut expander, "code-77");
    gateway
        .live_codes
        .insert(("77".into(), "tok".into()), "code-77".into());

    let mut root = node("根");
    root.in_class_main_resource = vec![
        live("1", "直播回放", "gaodunapp://gd/liveroom/v2/replays/detail?recordId=r1&did=d1&roomId=77&token=tok"),
        live("2", "过期回放", "gaodunapp://gd/liveroom/v2/replays/detail?recordId=r2&did=d1&roomId=78&token=expired"),
        live("3", "坏链接", "gaodunapp://gd/other"),
    ];
    gateway.gradations = vec![gstudy_gradation("阶段", "s1")];
    gateway.gstudy_syllabi.insert("s1".into(), root);

    let extraction = extractor(Arc::new(gateway), expander, 4)
        .extract_course("3")
        .await
        .unwrap();
    // 换取失败与链接无效只是跳过，不计为分支错误
    assert_eq!(extraction.media.len(), 1);
    assert!(extraction.failures.is_empty());
    let media = &extraction.media[0];
    assert_eq!(media.url, "gaodun://video/code-77");
    assert!(media.streams.contains_key("code-77_SD"));
}

const REPLAY_LINK: &str = "gaodunapp://gd/liveroom/v2/replays/detail?recordId=r1&did=d1&roomId=77&token=tok";

/// 两个章节引用同一个回放链接
fn shared_replay_course() -> (MockGateway, MockExpander) {
    let mut gateway = MockGateway {
        delay: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let mut expander = MockExpander::default();
    register_video(&mut gateway, &mut expander, "code-77");
    gateway
        .live_codes
        .insert(("77".into(), "tok".into()), "code-77".into());

    let mut c1 = node("第一章");
    c1.in_class_main_resource = vec![live("1", "回放上", REPLAY_LINK)];
    let mut c2 = node("第二章");
    c2.after_class_resource = vec![live("2", "回放下", REPLAY_LINK)];
    let mut root = node("根");
    root.children = vec![c1, c2];
    gateway.gradations = vec![gstudy_gradation("阶段", "s1")];
    gateway.gstudy_syllabi.insert("s1".into(), root);
    (gateway, expander)
}

#[tokio::test]
async fn test_shared_replay_is_exchanged_once_per_course() {
    let (gateway, expander) = shared_replay_course();
    let gateway = Arc::new(gateway);

    let extraction = extractor(gateway.clone(), expander, 4)
        .extract_course("3")
        .await
        .unwrap();

    // 两个槽位并发解析，同一 (房间, token) 只换取一次
    assert_eq!(gateway.live_checks(), 1);
    assert_eq!(extraction.media.len(), 2);
    assert!(extraction.failures.is_empty());
    assert!(extraction
        .media
        .iter()
        .all(|m| m.url == "gaodun://video/code-77"));
}

#[tokio::test]
async fn test_replay_codes_are_not_reused_across_courses() {
    let (gateway, expander) = shared_replay_course();
    let gateway = Arc::new(gateway);
    let extractor = extractor(gateway.clone(), expander, 4);

    let first = extractor.extract_course("3").await.unwrap();
    let second = extractor.extract_course("3").await.unwrap();

    // 每次提取重新换取，视频码可能已随 token 过期
    assert_eq!(gateway.live_checks(), 2);
    assert_eq!(first.media.len(), 2);
    assert_eq!(second.media.len(), 2);
}

#[tokio::test]
async fn test_huge_file_size_saturates() {
    let mut gateway = MockGateway::default();
    let mut expander = MockExpander::default();
    register_video(&mut gateway, &mut expander, "big");
    if let Some(info) = gateway.videos.get_mut("big") {
        for q in info.list.values_mut() {
            q.file_size = u64::MAX / 2;
        }
    }

    let mut root = node("根");
    root.in_class_main_resource = vec![video("1", "超大视频", "big")];
    gateway.gradations = vec![gstudy_gradation("阶段", "s1")];
    gateway.gstudy_syllabi.insert("s1".into(), root);

    let extraction = extractor(Arc::new(gateway), expander, 4)
        .extract_course("4")
        .await
        .unwrap();
    assert!(extraction.failures.is_empty());
    assert_eq!(extraction.media.len(), 1);
    assert_eq!(extraction.media[0].streams["big_SD"].size, u64::MAX);
}

#[tokio::test]
async fn test_epstudy_maps_only_resource_nodes() {
    let mut gateway = MockGateway::default();
    let mut expander = MockExpander::default();
    register_video(&mut gateway, &mut expander, "v9");

    let mut lesson = node("第一讲");
    lesson.is_resource = true;
    lesson.in_class_main_resource = vec![video("1", "第一讲视频", "v9")];

    let mut nested = node("附录");
    nested.is_resource = true;
    nested.after_class_resource = vec![note("2", "附录讲义", "https://cdn.example.com/a.pdf")];

    let mut chapter = node("第一章");
    // 非资源节点自身携带的资源不参与映射
    chapter.pre_class_resource = vec![note("3", "被忽略", "https://cdn.example.com/x.pdf")];
    chapter.children = vec![nested];

    gateway.gradations = vec![ep_gradation("", "探测")];
    gateway.ep_gradations = vec![ep_gradation("e1", "基础"), ep_gradation("", "无ID")];
    gateway.ep_syllabi.insert("e1".into(), vec![lesson, chapter]);

    let extraction = extractor(Arc::new(gateway), expander, 4)
        .extract_course("88")
        .await
        .unwrap();
    assert_eq!(extraction.schema, CourseSchema::EpStudy);
    assert!(extraction.failures.is_empty());
    let titles: Vec<_> = extraction.media.iter().map(|m| m.title.clone()).collect();
    assert_eq!(
        titles,
        vec![
            Path::new("88/基础/第一讲/第一讲视频").to_path_buf(),
            Path::new("88/基础/附录/附录讲义").to_path_buf(),
        ]
    );
}

#[tokio::test]
async fn test_failing_gradation_is_swallowed() {
    let mut gateway = MockGateway::default();
    let mut root = node("根");
    root.pre_class_resource = vec![note("1", "讲义", "https://cdn.example.com/1.pdf")];
    gateway.gradations = vec![
        gstudy_gradation("可用", "s1"),
        gstudy_gradation("不可用", "missing"),
    ];
    gateway.gstudy_syllabi.insert("s1".into(), root);

    let extraction = extractor(Arc::new(gateway), MockExpander::default(), 4)
        .extract_course("5")
        .await
        .unwrap();
    assert_eq!(extraction.media.len(), 1);
    assert_eq!(extraction.failures.len(), 1);
    assert!(extraction.failures[0].scope.contains("不可用"));
}

#[tokio::test]
async fn test_failing_epstudy_gradation_is_swallowed() {
    let mut gateway = MockGateway::default();
    let mut lesson = node("第一讲");
    lesson.is_resource = true;
    lesson.pre_class_resource = vec![note("1", "讲义", "https://cdn.example.com/1.pdf")];

    gateway.gradations = vec![ep_gradation("", "探测")];
    gateway.ep_gradations = vec![ep_gradation("e1", "基础"), ep_gradation("e2", "强化")];
    gateway.ep_syllabi.insert("e1".into(), vec![lesson]);

    let extraction = extractor(Arc::new(gateway), MockExpander::default(), 4)
        .extract_course("6")
        .await
        .unwrap();
    assert_eq!(extraction.schema, CourseSchema::EpStudy);
    assert_eq!(extraction.media.len(), 1);
    assert_eq!(extraction.media[0].title, Path::new("6/基础/第一讲/讲义"));
    assert_eq!(extraction.failures.len(), 1);
    assert!(extraction.failures[0].scope.contains("强化"));
}

#[tokio::test]
async fn test_gradation_without_root_is_skipped() {
    let mut gateway = MockGateway::default();
    let mut bare = gstudy_gradation("空阶段", "s0");
    bare.glive_syllabus = None;
    gateway.gradations = vec![gstudy_gradation("阶段", "s1"), bare];
    gateway.gstudy_syllabi.insert("s1".into(), node("根"));

    let extraction = extractor(Arc::new(gateway), MockExpander::default(), 4)
        .extract_course("5")
        .await
        .unwrap();
    assert!(extraction.media.is_empty());
    assert!(extraction.failures.is_empty());
}

#[tokio::test]
async fn test_fatal_errors_propagate() {
    let empty = extractor(Arc::new(MockGateway::default()), MockExpander::default(), 4);
    assert!(matches!(
        empty.extract_course("404").await,
        Err(AppError::NoGradation(id)) if id == "404"
    ));

    let expired = MockGateway {
        fail_gradations: true,
        ..Default::default()
    };
    let expired = extractor(Arc::new(expired), MockExpander::default(), 4);
    assert!(matches!(
        expired.extract_course("1").await,
        Err(AppError::SessionExpired)
    ));

    assert!(matches!(
        empty.extract("https://www.gaodun.com/course/detail").await,
        Err(AppError::CourseIdNotFound(_))
    ));
}

#[tokio::test]
async fn test_strict_schema_rejects_mixed_gradations() {
    let mut gateway = MockGateway::default();
    gateway.gradations = vec![gstudy_gradation("a", "s1"), ep_gradation("e", "b")];
    let gateway = Arc::new(gateway);

    let lenient = extractor(gateway.clone(), MockExpander::default(), 4);
    assert_eq!(
        lenient.extract_course("2").await.unwrap().schema,
        CourseSchema::GStudy
    );

    let strict = extractor(gateway, MockExpander::default(), 4).with_strict_schema(true);
    assert!(matches!(
        strict.extract_course("2").await,
        Err(AppError::SchemaMismatch { index: 1, .. })
    ));
}

#[tokio::test]
async fn test_in_flight_requests_are_bounded() {
    let mut gateway = MockGateway {
        delay: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let mut expander = MockExpander::default();

    let mut root = node("根");
    for i in 0..6 {
        let mut chapter = node(&format!("第{}章", i));
        for j in 0..3 {
            let id = format!("v{}_{}", i, j);
            register_video(&mut gateway, &mut expander, &id);
            chapter
                .in_class_main_resource
                .push(video(&id, &format!("视频{}", j), &id));
        }
        root.children.push(chapter);
    }
    gateway.gradations = vec![gstudy_gradation("阶段", "s1")];
    gateway.gstudy_syllabi.insert("s1".into(), root);

    let gateway = Arc::new(gateway);
    let extraction = extractor(gateway.clone(), expander, 2)
        .extract_course("7")
        .await
        .unwrap();
    assert_eq!(extraction.media.len(), 18);
    assert!(gateway.peak() <= 2, "峰值并发 {} 超出上限", gateway.peak());
    assert!(gateway.peak() >= 1);
}
