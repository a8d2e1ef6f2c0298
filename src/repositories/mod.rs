//! Redis repository: revocation list, users cache, event topic.

mod redis_repo;

pub use redis_repo::RedisRepository;
