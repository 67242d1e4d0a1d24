// src/extractor/locator.rs

use crate::error::*;
use regex::Regex;
use std::sync::LazyLock;

static COURSE_ID_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:course_id|courseId)=(\d+)").unwrap());
static COURSE_ID_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/course/(\d+)").unwrap());
static LIVE_REPLAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"gaodunapp://gd/liveroom/v2/replays/detail\?recordId=([a-zA-Z0-9]+)&did=[a-zA-Z0-9]+&roomId=([a-zA-Z0-9-]+)&token=([a-zA-Z0-9]+)",
    )
    .unwrap()
});

/// 从课程链接中提取课程 ID：先找查询参数，再找 `/course/<数字>` 路径
pub fn extract_course_id(url: &str) -> AppResult<String> {
    [&*COURSE_ID_PARAM_RE, &*COURSE_ID_PATH_RE]
        .into_iter()
        .find_map(|re| re.captures(url).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AppError::CourseIdNotFound(url.to_string()))
}

/// 从 App 回放深链中提取 (房间ID, token)，记录 ID 与设备 ID 不需要
pub fn extract_room_and_token(url: &str) -> AppResult<(String, String)> {
    LIVE_REPLAY_RE
        .captures(url)
        .and_then(|caps| Some((caps.get(2)?.as_str().to_string(), caps.get(3)?.as_str().to_string())))
        .ok_or_else(|| AppError::LiveLinkInvalid(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_course_id() {
        let cases = [
            ("https://gaodun.com/course?course_id=17244", "17244"),
            ("https://gaodun.com/course?courseId=17244", "17244"),
            ("https://gaodun.com/course/17244", "17244"),
            ("https://v.gaodun.com/study/course/33795?from=app", "33795"),
        ];
        for (url, expected) in cases {
            assert_eq!(extract_course_id(url).unwrap(), expected, "url: {}", url);
        }
    }

    #[test]
    fn test_query_param_wins_over_path() {
        let url = "https://gaodun.com/course/111?courseId=222";
        assert_eq!(extract_course_id(url).unwrap(), "222");
    }

    #[test]
    fn test_extract_course_id_not_found() {
        let err = extract_course_id("https://gaodun.com/invalid").unwrap_err();
        assert!(matches!(err, AppError::CourseIdNotFound(_)));
        assert!(extract_course_id("https://gaodun.com/course/abc").is_err());
    }

    #[test]
    fn test_extract_room_and_token() {
        let link = "gaodunapp://gd/liveroom/v2/replays/detail?recordId=abc123&did=dev42&roomId=room-7f3a&token=T0k3n";
        let (room, token) = extract_room_and_token(link).unwrap();
        assert_eq!(room, "room-7f3a");
        assert_eq!(token, "T0k3n");
    }

    #[test]
    fn test_extract_room_and_token_rejects_other_links() {
        assert!(matches!(
            extract_room_and_token("https://gaodun.com/replay?roomId=1&token=2"),
            Err(AppError::LiveLinkInvalid(_))
        ));
        assert!(extract_room_and_token("").is_err());
    }
}
