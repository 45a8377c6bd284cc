use crate::middlewares::v1::auth::Auth;
use crate::responses::v1::auth::Me;

#[tracing::instrument(skip(auth), fields(user_id = auth.user.id))]
pub fn authenticated(auth: Auth) -> Me {
    tracing::debug!("Returning authenticated user information");
    Me {
        user: auth.user.into(),
    }
}
