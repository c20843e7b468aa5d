//! KeyGenerator port - object key 生成の抽象化
//!
//! offload 1 件ごとに一意な key を払い出します。
//! テスト容易性のために、trait として抽象化しています。
//!
//! # 実装
//! - **UlidKeyGenerator**: ULID ベース（本番用）

use crate::ports::Clock;
use ulid::Ulid;

/// KeyGenerator は衝突しない object key を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait KeyGenerator: Send + Sync {
    fn generate_key(&self) -> String;
}

/// UlidKeyGenerator は ULID ベースの key 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// 26 文字の Crockford Base32 なので、handle のマーカーと衝突しません。
pub struct UlidKeyGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidKeyGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> KeyGenerator for UlidKeyGenerator<C> {
    fn generate_key(&self) -> String {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::handle::{BUCKET_MARKER, KEY_MARKER};
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    #[test]
    fn generates_unique_keys() {
        let key_gen = UlidKeyGenerator::new(SystemClock);
        let keys: HashSet<String> = (0..1000).map(|_| key_gen.generate_key()).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn fixed_clock_pins_timestamp_only() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let key_gen = UlidKeyGenerator::new(FixedClock::new(fixed_time));

        let key1 = key_gen.generate_key();
        let key2 = key_gen.generate_key();

        // ランダム部分があるので key は異なる
        assert_ne!(key1, key2);

        // ただし、timestamp 部分は同じはず
        let ts1 = Ulid::from_string(&key1).unwrap().timestamp_ms();
        let ts2 = Ulid::from_string(&key2).unwrap().timestamp_ms();
        assert_eq!(ts1, ts2);
        assert_eq!(ts1, fixed_time.timestamp_millis() as u64);
    }

    #[test]
    fn keys_never_contain_handle_markers() {
        let key = UlidKeyGenerator::new(SystemClock).generate_key();
        assert_eq!(key.len(), 26);
        assert!(!key.contains(BUCKET_MARKER));
        assert!(!key.contains(KEY_MARKER));
    }
}
