//! User-facing message catalogue (Japanese).

use membercard_members::ValidationCode;

pub const INVALID_CREDENTIALS: &str = "ログイン情報が正しくありません";
pub const MEMBER_NOT_FOUND: &str = "会員が見つかりません";
pub const UNAUTHORIZED: &str = "ログインが必要です";
pub const FORBIDDEN: &str = "アクセス権限がありません";
pub const ADMIN_DISABLED: &str = "管理機能は現在利用できません";
pub const VALIDATION_ERROR: &str = "入力内容に誤りがあります";
pub const SERVER_ERROR: &str = "サーバーエラーが発生しました";
pub const IDENTITY_ERROR: &str = "認証サービスとの通信に失敗しました";
pub const EMAIL_ALREADY_EXISTS: &str = "このメールアドレスは既に登録されています";
pub const MEMBER_NUMBER_ALREADY_EXISTS: &str = "この会員番号は既に使用されています";
pub const INVALID_CURRENT_PASSWORD: &str = "現在のパスワードが間違っています";
pub const PASSWORD_MISMATCH: &str = "パスワードが一致しません";

pub const LOGIN_SUCCESS: &str = "ログインしました";
pub const REGISTER_SUCCESS: &str = "会員登録が完了しました";
pub const PROFILE_UPDATED: &str = "プロフィールを更新しました";
pub const MEMBER_UPDATED: &str = "会員情報を更新しました";
pub const MEMBER_DELETED: &str = "会員を削除しました";
pub const IDENTITY_LINKED: &str = "認証ユーザーを連携しました";
pub const BACKFILL_FINISHED: &str = "認証ユーザーの一括作成が完了しました";

pub fn validation_message(field: &str, code: ValidationCode) -> &'static str {
    match (field, code) {
        (_, ValidationCode::Required) => "この項目は必須です",
        ("name", ValidationCode::TooLong) => "氏名は100文字以内で入力してください",
        (_, ValidationCode::TooLong) => "入力が長すぎます",
        (_, ValidationCode::InvalidEmail) => "有効なメールアドレスを入力してください",
        (_, ValidationCode::PasswordTooShort) => "パスワードが短すぎます",
        (_, ValidationCode::PasswordChangeIncomplete) => {
            "パスワード変更時は現在のパスワード、新しいパスワード、確認用パスワードがすべて必要です"
        }
        (_, ValidationCode::OutOfRange) => "指定できる範囲を超えています",
        (_, ValidationCode::InvalidValue) => "指定された値は使用できません",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_has_dedicated_message() {
        assert_eq!(
            validation_message("name", ValidationCode::TooLong),
            "氏名は100文字以内で入力してください"
        );
        assert_eq!(
            validation_message("email", ValidationCode::TooLong),
            "入力が長すぎます"
        );
    }
}
