//! Scenario catalog.
//!
//! Identifiers follow `Test<scenario><Type><n>`. Groups are registered leaves
//! first because a builder can only reference fixtures that already exist.

use forcedata_factory::{Factory, FactoryOptions, Result};
use serde_json::Value;

use crate::model::{Android, Base, Device, Fixture, Friends, HairStyle, Ios};

pub const TEST01_ANDROID_1: &str = "Test01Android1";
pub const TEST01_IOS_1: &str = "Test01Ios1";
pub const TEST01_HAIR_STYLE_1: &str = "Test01HairStyle1";
pub const TEST01_FRIENDS_1: &str = "Test01Friends1";
pub const TEST01_FRIENDS_2: &str = "Test01Friends2";
pub const TEST02_FRIENDS_2: &str = "Test02Friends2";
pub const TEST04_FRIENDS_3: &str = "Test04Friends3";
pub const TEST01_DEVICE_1: &str = "Test01Device1";
pub const TEST05_DEVICE_1: &str = "Test05Device1";
pub const TEST01_BASE_1: &str = "Test01Base1";
pub const TEST02_BASE_1: &str = "Test02Base1";
pub const TEST03_BASE_1: &str = "Test03Base1";
pub const TEST04_BASE_1: &str = "Test04Base1";
pub const TEST05_BASE_1: &str = "Test05Base1";
pub const TEST06_BASE_1: &str = "Test06Base1";

/// Output file name -> top-level fixture written to it.
pub const TEST_DATA: &[(&str, &str)] = &[
    ("test01.json", TEST01_BASE_1),
    ("test02.json", TEST02_BASE_1),
    ("test03.json", TEST03_BASE_1),
    ("test04.json", TEST04_BASE_1),
    ("test05.json", TEST05_BASE_1),
    ("test06.json", TEST06_BASE_1),
];

/// A factory holding the whole catalog, with default options.
pub fn catalog() -> Result<Factory<Fixture>> {
    catalog_with(FactoryOptions::default())
}

pub fn catalog_with(options: FactoryOptions) -> Result<Factory<Fixture>> {
    let mut factory = Factory::with_options(options);
    register_catalog(&mut factory)?;
    Ok(factory)
}

pub fn register_catalog(f: &mut Factory<Fixture>) -> Result<()> {
    register_android(f)?;
    register_ios(f)?;
    register_hair_style(f)?;
    register_friends(f)?;
    register_device(f)?;
    register_base(f)?;
    Ok(())
}

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

pub fn register_android(f: &mut Factory<Fixture>) -> Result<()> {
    f.register(TEST01_ANDROID_1, |_| {
        Ok(Android {
            manufacturer: text("google"),
            model: text("pixel5"),
        }
        .into())
    })
}

pub fn register_ios(f: &mut Factory<Fixture>) -> Result<()> {
    f.register(TEST01_IOS_1, |_| {
        Ok(Ios {
            manufacturer: text("apple"),
            model: text("iphone12"),
        }
        .into())
    })
}

pub fn register_hair_style(f: &mut Factory<Fixture>) -> Result<()> {
    f.register(TEST01_HAIR_STYLE_1, |_| Ok(HairStyle {}.into()))
}

pub fn register_friends(f: &mut Factory<Fixture>) -> Result<()> {
    f.register(TEST01_FRIENDS_1, |_| {
        Ok(Friends {
            id: Some(0),
            name: text("Colon Salazar"),
        }
        .into())
    })?;
    f.register(TEST01_FRIENDS_2, |_| {
        Ok(Friends {
            id: Some(1),
            name: text("French\nMcneil"),
        }
        .into())
    })?;
    f.register(TEST02_FRIENDS_2, |ctx| {
        let mut data: Friends = ctx.parent(TEST01_FRIENDS_2)?;
        data.name = text("French\nMcneil2");
        Ok(data.into())
    })?;
    f.register(TEST04_FRIENDS_3, |_| {
        Ok(Friends {
            id: Some(2),
            name: text("Nestor Salinas"),
        }
        .into())
    })
}

pub fn register_device(f: &mut Factory<Fixture>) -> Result<()> {
    f.register(TEST01_DEVICE_1, |ctx| {
        Ok(Device {
            android: Some(ctx.child(TEST01_ANDROID_1)?),
            ios: Some(ctx.child(TEST01_IOS_1)?),
        }
        .into())
    })?;
    f.register(TEST05_DEVICE_1, |_| Ok(Device::default().into()))
}

pub fn register_base(f: &mut Factory<Fixture>) -> Result<()> {
    f.register(TEST01_BASE_1, |ctx| {
        Ok(Base {
            id: text("5973782bdb9a930533b05cb2"),
            is_active: Some(true),
            age: Some(32),
            name: text("Logan Keller"),
            gender: text("male"),
            eye_color: Value::Null,
            hair_style: Some(ctx.child(TEST01_HAIR_STYLE_1)?),
            salery: Some(9_007_199_254_740_991),
            friends: Some(vec![
                ctx.child(TEST01_FRIENDS_1)?,
                ctx.child(TEST01_FRIENDS_2)?,
            ]),
            groups: Some(vec![Some(1), Some(2), Some(3)]),
            rooms: Some(vec![text("1-1"), text("1-2")]),
            device: Some(ctx.child(TEST01_DEVICE_1)?),
            qualifications: None,
        }
        .into())
    })?;
    f.register(TEST02_BASE_1, |ctx| {
        let mut data: Base = ctx.parent(TEST01_BASE_1)?;
        data.is_active = Some(false);
        let replacement: Friends = ctx.child(TEST02_FRIENDS_2)?;
        if let Some(slot) = data.friends.as_mut().and_then(|friends| friends.get_mut(1)) {
            *slot = replacement;
        }
        data.groups = Some(vec![Some(1), Some(2), Some(3), Some(4)]);
        data.qualifications = Some(Vec::new());
        Ok(data.into())
    })?;
    f.register(TEST03_BASE_1, |ctx| {
        let mut data: Base = ctx.parent(TEST02_BASE_1)?;
        data.qualifications = Some(Vec::new());
        Ok(data.into())
    })?;
    f.register(TEST04_BASE_1, |ctx| {
        let mut data: Base = ctx.parent(TEST01_BASE_1)?;
        data.friends = Some(vec![
            ctx.child(TEST01_FRIENDS_1)?,
            ctx.child(TEST01_FRIENDS_2)?,
            ctx.child(TEST04_FRIENDS_3)?,
        ]);
        data.qualifications = Some(Vec::new());
        Ok(data.into())
    })?;
    f.register(TEST05_BASE_1, |ctx| {
        Ok(Base {
            id: text("05"),
            device: Some(ctx.child(TEST05_DEVICE_1)?),
            ..Base::default()
        }
        .into())
    })?;
    f.register(TEST06_BASE_1, |_| {
        Ok(Base {
            id: text("06"),
            qualifications: Some(Vec::new()),
            ..Base::default()
        }
        .into())
    })
}
