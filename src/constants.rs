pub mod limits {

    pub const MIN_TITLE_LEN: usize = 10;

    pub const MIN_CONTENT_LEN: usize = 20;

    pub const MIN_PASSWORD_LEN: usize = 8;

    pub const MIN_USERNAME_LEN: usize = 3;

    pub const MAX_USERNAME_LEN: usize = 32;
}

pub mod auth {

    pub const BEARER_PREFIX: &str = "Bearer ";

    pub const TOKEN_TYPE: &str = "Bearer";
}
