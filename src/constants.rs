// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const TITLE_TRUNCATE_LENGTH: usize = 60;
pub const MAX_SEGMENT_CHARS: usize = 100;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const TOKEN_ENV_VAR: &str = "GAODUN_AUTH_TOKEN";
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

pub const SITE_NAME: &str = "高顿教育 gaodun.com";
pub const USER_AGENT: &str =
    "GdClient/10.0.81 Android/14 H2OS/110_14.0.0.630(cn01) GdNetwork/1.0.5";
pub const API_VERSION: &str = "264";
/// 响应体中出现该文本即视为会话过期
pub const SESSION_EXPIRED_MARKER: &str = "登录超时";

pub mod api {
    pub const DEFAULT_ENDPOINT: &str = "https://apigateway.gaodun.com";
    pub const DEFAULT_RESOLUTION: &str = "SD";
    pub const DEFAULT_CHANNEL: u32 = 0;

    pub mod paths {
        pub const GSTUDY_GRADATIONS: &str =
            "/g-study/api/v1/front/course/{course_id}/gradation/syllabus";
        pub const GSTUDY_SYLLABUS: &str =
            "/g-study/api/v1/front/course/{course_id}/syllabus/glive/{syllabus_id}";
        pub const EP_GRADATIONS: &str = "/ep-study/front/course/{course_id}/gradation";
        pub const EP_SYLLABUS: &str =
            "/ep-study/front/course/{course_id}/syllabus/{syllabus_id}?show_own_teacher=true";
        pub const LIVE_CHECK: &str = "/glive2-vod/api/v1/vod/check";
        pub const LIVE_RESOURCE: &str = "/glive2-vod/api/v1/live/resource";
    }

    pub mod status {
        /// g-study / ep-study 接口的成功状态码
        pub const STUDY_OK: i64 = 0;
        /// glive2-vod 接口的成功状态码
        pub const VOD_OK: i64 = 200;
    }

    pub mod discriminators {
        pub const LIVE_NEW: &str = "live_new";
        pub const VIDEO: &str = "video";
        pub const LECTURE_NOTE: &str = "lecture_note";
    }

    pub mod mime_types {
        pub const PDF: &str = "application/pdf";
        pub const DOC: &str = "application/msword";
        pub const DOCX: &str =
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
    }

    pub mod extensions {
        pub const PDF: &str = "pdf";
        pub const DOC: &str = "doc";
        pub const DOCX: &str = "docx";
        pub const FALLBACK: &str = "file";
        pub const SEGMENT: &str = "ts";
    }
}
