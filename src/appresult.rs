use serde_json::Value;

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(serde_json::Error);

/// Field access on loosely-typed JSON frames.
pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
    fn get_opt_str_field(&self, field: &str) -> AppResult<Option<String>>;
    fn get_obj_field(&self, field: &str) -> AppResult<&Value>;
}

impl GetField for Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(format!("expected {field} in {self}"))?
            .as_str()
            .ok_or(format!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_opt_str_field(&self, field: &str) -> AppResult<Option<String>> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(
                value
                    .as_str()
                    .ok_or(format!("expected {field} in {self} to be string"))?
                    .to_owned()
            )),
        }
    }

    fn get_obj_field(&self, field: &str) -> AppResult<&Value> {
        self.get(field)
        .ok_or(format!("expected {field} in {self}").into())
    }
}
