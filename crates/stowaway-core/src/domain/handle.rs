//! Receipt handle へのポインタ埋め込み
//!
//! offload されたメッセージを受信したとき、receipt handle の前に bucket と key を
//! マーカーで挟んで付け足します。delete 時にはこれを分解して、元の handle と
//! 削除すべきオブジェクトの両方を取り出します。
//!
//! ```text
//! -..s3BucketName..-<bucket>-..s3BucketName..--..s3Key..-<key>-..s3Key..-<original handle>
//! ```
//!
//! # 既知の制約
//! マーカーはエスケープされません。bucket 名や key にマーカー文字列そのものが
//! 含まれている場合、分解結果は壊れます。key はこのクレート自身が ULID で生成するため
//! 通常は問題になりませんが、外部から受け取ったポインタでは保証されません。

use super::pointer::{ObjectPointer, PointerError};

pub const BUCKET_MARKER: &str = "-..s3BucketName..-";
pub const KEY_MARKER: &str = "-..s3Key..-";

/// 元の handle の前に bucket/key を埋め込む
pub fn embed_in_handle(original_handle: &str, pointer: &ObjectPointer) -> String {
    let mut handle = String::with_capacity(
        original_handle.len()
            + pointer.bucket().len()
            + pointer.key().len()
            + 2 * (BUCKET_MARKER.len() + KEY_MARKER.len()),
    );
    handle.push_str(BUCKET_MARKER);
    handle.push_str(pointer.bucket());
    handle.push_str(BUCKET_MARKER);
    handle.push_str(KEY_MARKER);
    handle.push_str(pointer.key());
    handle.push_str(KEY_MARKER);
    handle.push_str(original_handle);
    handle
}

/// 両方のマーカーが含まれていれば埋め込み済みとみなす
pub fn is_modified_handle(handle: &str) -> bool {
    handle.contains(BUCKET_MARKER) && handle.contains(KEY_MARKER)
}

/// 埋め込み済み handle を (元の handle, ポインタ) に分解
///
/// 最初のマーカー対が bucket、その直後から探した 2 つ目のマーカー対が key、
/// 残りがすべて元の handle です。
pub fn split_handle(modified_handle: &str) -> Result<(String, ObjectPointer), PointerError> {
    let (bucket, rest) = between_markers(modified_handle, BUCKET_MARKER)?;
    let (key, original) = between_markers(rest, KEY_MARKER)?;
    Ok((original.to_string(), ObjectPointer::new(bucket, key)))
}

/// `marker` で挟まれた部分と、閉じマーカー以降の残りを返す
fn between_markers<'a>(input: &'a str, marker: &str) -> Result<(&'a str, &'a str), PointerError> {
    let missing = || PointerError::Format(format!("receipt handle is missing marker {marker}"));

    let open = input.find(marker).ok_or_else(missing)?;
    let value_start = open + marker.len();
    let close = input[value_start..]
        .find(marker)
        .map(|offset| value_start + offset)
        .ok_or_else(missing)?;

    Ok((&input[value_start..close], &input[close + marker.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn embed_produces_marker_layout() {
        let pointer = ObjectPointer::new("test-bucket", "test-key");
        let handle = embed_in_handle("receipt-1", &pointer);
        assert_eq!(
            handle,
            "-..s3BucketName..-test-bucket-..s3BucketName..--..s3Key..-test-key-..s3Key..-receipt-1"
        );
    }

    #[rstest]
    #[case("AQEBzWwaftRI0KuVm4tP+/7q1rGgNqicHq", "my-bucket", "01J9Z3Q8W6Y0M3K4N5P6R7S8T9")]
    #[case("", "b", "k")]
    #[case("handle-with-..-dots", "bucket.with.dots", "nested/path/key")]
    #[case("h", "", "")]
    fn split_recovers_embedded_parts(#[case] original: &str, #[case] bucket: &str, #[case] key: &str) {
        let pointer = ObjectPointer::new(bucket, key);
        let handle = embed_in_handle(original, &pointer);

        assert!(is_modified_handle(&handle));
        let (recovered, recovered_pointer) = split_handle(&handle).unwrap();
        assert_eq!(recovered, original);
        assert_eq!(recovered_pointer, pointer);
    }

    #[rstest]
    #[case::plain("AQEBzWwaftRI0KuVm4tP")]
    #[case::bucket_only("-..s3BucketName..-b-..s3BucketName..-handle")]
    #[case::key_only("-..s3Key..-k-..s3Key..-handle")]
    fn plain_handles_are_not_modified(#[case] handle: &str) {
        assert!(!is_modified_handle(handle));
    }

    #[rstest]
    #[case::unclosed_bucket("-..s3BucketName..-b-..s3Key..-k-..s3Key..-h")]
    #[case::unclosed_key("-..s3BucketName..-b-..s3BucketName..--..s3Key..-k")]
    #[case::key_before_bucket("-..s3Key..-k-..s3Key..--..s3BucketName..-b-..s3BucketName..-h")]
    fn split_rejects_misplaced_markers(#[case] handle: &str) {
        assert!(matches!(split_handle(handle), Err(PointerError::Format(_))));
    }
}
